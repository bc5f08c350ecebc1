use async_trait::async_trait;

use super::models::{Account, AccountStatus, NewAccount};
use crate::core_types::AccountId;
use crate::ledger::StoreError;

/// Lookup side of the account store.
///
/// Account numbers and emails are unique; phone numbers are shared by up to
/// [`super::MAX_ACCOUNTS_PER_PHONE`] accounts.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Get account by ID
    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Exact match on the unique account number
    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Every account registered with this phone number, ordered by id
    async fn find_by_phone(&self, phone: &str) -> Result<Vec<Account>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Create an active account with a zero balance.
    ///
    /// Fails with [`StoreError::Duplicate`] on a taken email/account number and
    /// [`StoreError::PhoneLimitReached`] when the phone is already shared by
    /// the maximum number of accounts.
    async fn open_account(&self, new: NewAccount) -> Result<Account, StoreError>;

    /// Administrative status change
    async fn set_status(&self, id: AccountId, status: AccountStatus)
    -> Result<Account, StoreError>;
}
