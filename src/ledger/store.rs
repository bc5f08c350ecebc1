use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StoreError;
use super::models::{
    CommitOutcome, PageRequest, PeriodSummary, PostingBatch, Transaction, TransactionFilter,
    TransactionPage, TransactionUpdate,
};
use crate::core_types::{AccountId, TransactionId};

/// Append-only transaction log plus the balance field it keeps in step.
///
/// `apply` is the only write path for balances.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Apply every posting of `batch` or none of them.
    ///
    /// Under the backend's lock for the touched accounts:
    /// 1. if `batch.idempotency_key` is already recorded for `batch.initiator`,
    ///    return [`CommitOutcome::Replayed`] with the original record(s);
    /// 2. re-read each balance and reject with `AccountNotFound`,
    ///    `AccountInactive` or `InsufficientBalance` if any posting cannot apply;
    /// 3. update balances and insert one transaction per posting.
    async fn apply(&self, batch: PostingBatch) -> Result<CommitOutcome, StoreError>;

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Records `user_id` committed under `key`, in creation order
    async fn find_by_idempotency_key(
        &self,
        user_id: AccountId,
        key: &str,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Filtered page, newest first
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<TransactionPage, StoreError>;

    /// Totals for `user_id` from `since` (inclusive) through now; all time if `None`
    async fn summarize(
        &self,
        user_id: AccountId,
        since: Option<DateTime<Utc>>,
    ) -> Result<PeriodSummary, StoreError>;

    /// Change description/category of a transaction owned by `owner`.
    ///
    /// A transaction owned by someone else is reported as not found.
    async fn update_details(
        &self,
        id: TransactionId,
        owner: AccountId,
        update: TransactionUpdate,
    ) -> Result<Transaction, StoreError>;
}
