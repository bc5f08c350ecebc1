//! Ledger operation errors
//!
//! Every variant except `Database` and `System` is a business rejection:
//! non-retryable, reported to the caller verbatim, no state changed.

use thiserror::Error;

use super::resolver::RecipientCandidate;
use crate::ledger::StoreError;
use crate::money::MoneyError;

#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    // === Validation Errors ===
    #[error("Amount must be a positive number with at most 2 decimal places")]
    InvalidAmount,

    #[error("Recipient bank name and account number or phone are required for external transfers")]
    MissingExternalBankDetails,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Business Rule Errors ===
    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Cannot transfer to your own account")]
    CannotTransferToSelf,

    #[error("Multiple accounts found for this phone number, please select one")]
    RecipientAmbiguous(Vec<RecipientCandidate>),

    // === Lookup Errors ===
    #[error("Account not found")]
    AccountNotFound,

    #[error("Account is not active")]
    AccountInactive,

    #[error("Transaction not found")]
    TransactionNotFound,

    // === System Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal system error: {0}")]
    System(String),
}

impl LedgerError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount => "INVALID_AMOUNT",
            LedgerError::MissingExternalBankDetails => "MISSING_EXTERNAL_BANK_DETAILS",
            LedgerError::InvalidRequest(_) => "INVALID_REQUEST",
            LedgerError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            LedgerError::CannotTransferToSelf => "CANNOT_TRANSFER_TO_SELF",
            LedgerError::RecipientAmbiguous(_) => "RECIPIENT_AMBIGUOUS",
            LedgerError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            LedgerError::AccountInactive => "ACCOUNT_INACTIVE",
            LedgerError::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            LedgerError::Database(_) => "DATABASE_ERROR",
            LedgerError::System(_) => "SYSTEM_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidAmount
            | LedgerError::MissingExternalBankDetails
            | LedgerError::InvalidRequest(_)
            | LedgerError::InsufficientBalance
            | LedgerError::CannotTransferToSelf => 400,
            LedgerError::RecipientAmbiguous(_) => 300,
            LedgerError::AccountInactive => 403,
            LedgerError::AccountNotFound | LedgerError::TransactionNotFound => 404,
            LedgerError::Database(_) => 503,
            LedgerError::System(_) => 500,
        }
    }

    /// Infrastructure failure rather than a business rejection
    pub fn is_server_error(&self) -> bool {
        matches!(self, LedgerError::Database(_) | LedgerError::System(_))
    }
}

impl From<MoneyError> for LedgerError {
    fn from(_: MoneyError) -> Self {
        LedgerError::InvalidAmount
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AccountNotFound(_) => LedgerError::AccountNotFound,
            StoreError::AccountInactive(_) => LedgerError::AccountInactive,
            StoreError::InsufficientBalance { .. } => LedgerError::InsufficientBalance,
            StoreError::TransactionNotFound(_) => LedgerError::TransactionNotFound,
            StoreError::Duplicate(what) => {
                LedgerError::InvalidRequest(format!("{} is already registered", what))
            }
            StoreError::PhoneLimitReached(phone) => LedgerError::InvalidRequest(format!(
                "phone number {} already has the maximum number of accounts",
                phone
            )),
            StoreError::Database(e) => LedgerError::Database(e.to_string()),
            StoreError::Internal(msg) => LedgerError::System(msg),
        }
    }
}
