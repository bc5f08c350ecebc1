//! Storage backend errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::core_types::{AccountId, TransactionId};

/// Errors raised by [`super::LedgerStore`] and [`crate::account::AccountDirectory`]
/// implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account {0} is not active")]
    AccountInactive(AccountId),

    #[error("Insufficient balance on account {account_id}: available {available}, required {required}")]
    InsufficientBalance {
        account_id: AccountId,
        available: Decimal,
        required: Decimal,
    },

    #[error("Duplicate {0}")]
    Duplicate(String),

    #[error("Phone number {0} already has the maximum number of accounts")]
    PhoneLimitReached(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal store error: {0}")]
    Internal(String),
}
