//! Recipient Resolver
//!
//! Turns the identifiers a sender typed into a transfer target. An account
//! number is unique and wins over a phone number; a phone number may be shared
//! by several accounts, in which case the caller must pick one.

use serde::Serialize;
use utoipa::ToSchema;

use crate::account::{Account, AccountDirectory, BankDetails};
use crate::core_types::AccountId;
use crate::ledger::StoreError;

/// Summary shown to the sender when a phone number is ambiguous
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipientCandidate {
    pub id: AccountId,
    pub name: String,
    pub account_number: String,
    pub bank_details: BankDetails,
}

impl From<&Account> for RecipientCandidate {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            account_number: account.account_number.clone(),
            bank_details: account.bank.clone(),
        }
    }
}

/// Outcome of recipient resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Exactly one internal account
    Resolved(Account),
    /// No internal account; the transfer is external
    NotFound,
    /// Several accounts share the phone number
    Ambiguous(Vec<RecipientCandidate>),
}

/// Treat blank input as absent
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub async fn resolve(
    directory: &dyn AccountDirectory,
    account_number: Option<&str>,
    phone: Option<&str>,
) -> Result<Resolution, StoreError> {
    if let Some(number) = non_blank(account_number) {
        return Ok(match directory.find_by_account_number(number).await? {
            Some(account) => Resolution::Resolved(account),
            None => Resolution::NotFound,
        });
    }

    let Some(phone) = non_blank(phone) else {
        return Ok(Resolution::NotFound);
    };

    let mut matches = directory.find_by_phone(phone).await?;
    Ok(match matches.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Resolved(matches.remove(0)),
        _ => Resolution::Ambiguous(matches.iter().map(RecipientCandidate::from).collect()),
    })
}
