//! Request and result types for ledger operations

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::account::{Account, BankDetails};
use crate::core_types::AccountId;
use crate::ledger::{Category, Transaction, TransferType};
use crate::money::amount_serde;

/// Deposit or withdrawal
#[derive(Debug, Clone, Default)]
pub struct MovementRequest {
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub idempotency_key: Option<String>,
}

impl MovementRequest {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransferRequest {
    pub recipient_account_number: Option<String>,
    pub recipient_phone: Option<String>,
    /// Required when the recipient is not an account here
    pub recipient_bank: Option<BankDetails>,
    pub amount: Decimal,
    pub description: Option<String>,
    pub idempotency_key: Option<String>,
}

impl TransferRequest {
    pub fn to_account(account_number: impl Into<String>, amount: Decimal) -> Self {
        Self {
            recipient_account_number: Some(account_number.into()),
            amount,
            ..Default::default()
        }
    }

    pub fn to_phone(phone: impl Into<String>, amount: Decimal) -> Self {
        Self {
            recipient_phone: Some(phone.into()),
            amount,
            ..Default::default()
        }
    }

    pub fn with_bank(mut self, bank: BankDetails) -> Self {
        self.recipient_bank = Some(bank);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Settlement estimate shown to the sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum EstimatedArrival {
    #[serde(rename = "instant")]
    Instant,
    #[serde(rename = "2-3 business days")]
    BusinessDays,
}

impl EstimatedArrival {
    pub fn for_type(transfer_type: TransferType) -> Self {
        match transfer_type {
            TransferType::Internal => EstimatedArrival::Instant,
            TransferType::External => EstimatedArrival::BusinessDays,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatedArrival::Instant => "instant",
            EstimatedArrival::BusinessDays => "2-3 business days",
        }
    }
}

/// Who the money is going to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipientSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankDetails>,
}

/// Fee and totals for a transfer, computed without committing it
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferPreview {
    pub transfer_type: TransferType,
    pub recipient: RecipientSummary,
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub transfer_amount: Decimal,
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub processing_fee: Decimal,
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub total_debit: Decimal,
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub current_balance: Decimal,
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub balance_after: Decimal,
    pub estimated_arrival: EstimatedArrival,
}

/// Result of a committed transfer
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    /// Sender's debit record
    pub transaction: Transaction,
    /// Recipient's credit record (internal transfers, not on replay)
    #[serde(skip)]
    pub recipient_transaction: Option<Transaction>,
    pub message: String,
    pub transfer_type: TransferType,
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub transfer_amount: Decimal,
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub processing_fee: Decimal,
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub total_debited: Decimal,
    pub estimated_arrival: EstimatedArrival,
    /// True when an earlier request with the same idempotency key was returned
    pub replayed: bool,
}

/// Account opening with an optional initial deposit
#[derive(Debug, Clone)]
pub struct OpenAccountRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub account_number: Option<String>,
    /// Home bank when absent
    pub bank: Option<BankDetails>,
    pub initial_deposit: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountOpening {
    pub account: Account,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_deposit: Option<Transaction>,
}
