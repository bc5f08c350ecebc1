//! Data models for customer accounts

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::AccountId;
use crate::money::amount_serde;

/// At most this many accounts may share one phone number
pub const MAX_ACCOUNTS_PER_PHONE: usize = 3;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Suspended => "suspended",
        }
    }

    /// Only active accounts may originate or receive money movements
    #[inline]
    pub fn can_transact(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            "suspended" => Ok(AccountStatus::Suspended),
            _ => Err(format!("Invalid account status: {}", s)),
        }
    }
}

/// Bank metadata attached to an account or an external recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub bank_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

/// Customer account
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub account_number: String,
    /// Never negative after a committed operation
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64, example = 1000.0)]
    pub balance: Decimal,
    pub status: AccountStatus,
    pub bank: BankDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account opening request
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Generated when absent
    pub account_number: Option<String>,
    pub bank: BankDetails,
}

/// Generate a 12-digit account number from a fresh ULID's random bits.
///
/// Collisions are possible; backends reject duplicates and the caller retries.
pub fn generate_account_number() -> String {
    let random = ulid::Ulid::new().random();
    format!("{:012}", random % 1_000_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_can_transact() {
        assert!(AccountStatus::Active.can_transact());
        assert!(!AccountStatus::Inactive.can_transact());
        assert!(!AccountStatus::Suspended.can_transact());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "SUSPENDED".parse::<AccountStatus>(),
            Ok(AccountStatus::Suspended)
        );
        assert_eq!("active".parse::<AccountStatus>(), Ok(AccountStatus::Active));
        assert!("closed".parse::<AccountStatus>().is_err());
    }

    #[test]
    fn test_generated_account_number_shape() {
        let number = generate_account_number();
        assert_eq!(number.len(), 12);
        assert!(number.bytes().all(|b| b.is_ascii_digit()));
    }
}
