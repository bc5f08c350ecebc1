//! In-process backend
//!
//! Every balance-changing batch takes a per-account async mutex for each
//! account it touches, always in ascending id order, then re-validates and
//! applies under those locks. Ledger records and balances are written while
//! holding the transaction log's write lock so readers never observe one
//! without the other.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use crate::account::{
    Account, AccountDirectory, AccountStatus, MAX_ACCOUNTS_PER_PHONE, NewAccount,
    generate_account_number,
};
use crate::core_types::{AccountId, TransactionId};
use crate::ledger::{
    CommitOutcome, LedgerStore, PageRequest, PeriodSummary, PostingBatch, StoreError,
    Transaction, TransactionFilter, TransactionPage, TransactionType, TransactionUpdate,
};
use crate::money::round2;

const ACCOUNT_NUMBER_ATTEMPTS: usize = 5;

/// Accounts and ledger held in memory
pub struct InMemoryStore {
    accounts: DashMap<AccountId, Account>,
    account_locks: DashMap<AccountId, Arc<Mutex<()>>>,
    /// Append order == creation order
    transactions: RwLock<Vec<Transaction>>,
    /// Serializes uniqueness checks on account opening
    registry: Mutex<()>,
    next_account_id: AtomicI64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            account_locks: DashMap::new(),
            transactions: RwLock::new(Vec::new()),
            registry: Mutex::new(()),
            next_account_id: AtomicI64::new(1),
        }
    }

    fn lock_for(&self, id: AccountId) -> Arc<Mutex<()>> {
        self.account_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire account locks in ascending id order
    async fn lock_accounts(&self, ids: &[AccountId]) -> Vec<OwnedMutexGuard<()>> {
        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.lock_for(*id).lock_owned().await);
        }
        guards
    }

    fn find_replay(
        log: &[Transaction],
        initiator: AccountId,
        key: &str,
    ) -> Option<Vec<Transaction>> {
        let found: Vec<Transaction> = log
            .iter()
            .filter(|tx| tx.user_id == initiator && tx.idempotency_key.as_deref() == Some(key))
            .cloned()
            .collect();
        (!found.is_empty()).then_some(found)
    }
}

#[async_trait]
impl AccountDirectory for InMemoryStore {
    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(&id).map(|a| a.value().clone()))
    }

    async fn find_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.account_number == account_number)
            .map(|a| a.value().clone()))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Vec<Account>, StoreError> {
        let mut found: Vec<Account> = self
            .accounts
            .iter()
            .filter(|a| a.phone == phone)
            .map(|a| a.value().clone())
            .collect();
        found.sort_by_key(|a| a.id);
        Ok(found)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .map(|a| a.value().clone()))
    }

    async fn open_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let _registry = self.registry.lock().await;

        if self.find_by_email(&new.email).await?.is_some() {
            return Err(StoreError::Duplicate(format!("email {}", new.email)));
        }
        if self.find_by_phone(&new.phone).await?.len() >= MAX_ACCOUNTS_PER_PHONE {
            return Err(StoreError::PhoneLimitReached(new.phone));
        }

        let account_number = match new.account_number {
            Some(number) => {
                if self.find_by_account_number(&number).await?.is_some() {
                    return Err(StoreError::Duplicate(format!("account number {}", number)));
                }
                number
            }
            None => {
                let mut generated = None;
                for _ in 0..ACCOUNT_NUMBER_ATTEMPTS {
                    let candidate = generate_account_number();
                    if self.find_by_account_number(&candidate).await?.is_none() {
                        generated = Some(candidate);
                        break;
                    }
                }
                generated.ok_or_else(|| {
                    StoreError::Internal("could not generate a unique account number".into())
                })?
            }
        };

        let now = Utc::now();
        let account = Account {
            id: self.next_account_id.fetch_add(1, Ordering::SeqCst),
            name: new.name,
            email: new.email,
            phone: new.phone,
            account_number,
            balance: Decimal::ZERO,
            status: AccountStatus::Active,
            bank: new.bank,
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn set_status(
        &self,
        id: AccountId,
        status: AccountStatus,
    ) -> Result<Account, StoreError> {
        let _guard = self.lock_for(id).lock_owned().await;
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or(StoreError::AccountNotFound(id))?;
        account.status = status;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn apply(&self, batch: PostingBatch) -> Result<CommitOutcome, StoreError> {
        let _guards = self.lock_accounts(&batch.lock_order()).await;

        if let Some(key) = batch.idempotency_key.as_deref() {
            let log = self.transactions.read().await;
            if let Some(original) = Self::find_replay(&log, batch.initiator, key) {
                debug!(account_id = batch.initiator, key, "Idempotent replay");
                return Ok(CommitOutcome::Replayed(original));
            }
        }

        // Validate every posting against current balances before touching anything
        let mut running: HashMap<AccountId, Decimal> = HashMap::new();
        let mut snapshots = Vec::with_capacity(batch.postings.len());
        for posting in &batch.postings {
            let id = posting.account_id;
            let current = match running.get(&id) {
                Some(balance) => *balance,
                None => {
                    let account = self.accounts.get(&id).ok_or(StoreError::AccountNotFound(id))?;
                    if !account.status.can_transact() {
                        return Err(StoreError::AccountInactive(id));
                    }
                    account.balance
                }
            };
            let next = round2(current + posting.draft.delta());
            if next < Decimal::ZERO {
                return Err(StoreError::InsufficientBalance {
                    account_id: id,
                    available: current,
                    required: round2(posting.draft.amount),
                });
            }
            running.insert(id, next);
            snapshots.push(next);
        }

        let now = Utc::now();
        let mut log = self.transactions.write().await;
        for (id, balance) in &running {
            if let Some(mut account) = self.accounts.get_mut(id) {
                account.balance = *balance;
                account.updated_at = now;
            }
        }

        let committed: Vec<Transaction> = batch
            .postings
            .into_iter()
            .zip(snapshots)
            .map(|(posting, balance_after)| {
                let key = (posting.account_id == batch.initiator)
                    .then(|| batch.idempotency_key.clone())
                    .flatten();
                posting.draft.commit(posting.account_id, balance_after, key, now)
            })
            .collect();
        log.extend(committed.iter().cloned());

        Ok(CommitOutcome::Applied(committed))
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let log = self.transactions.read().await;
        Ok(log.iter().find(|tx| tx.id == id).cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        user_id: AccountId,
        key: &str,
    ) -> Result<Vec<Transaction>, StoreError> {
        let log = self.transactions.read().await;
        Ok(Self::find_replay(&log, user_id, key).unwrap_or_default())
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<TransactionPage, StoreError> {
        let log = self.transactions.read().await;
        let matching: Vec<&Transaction> = log.iter().rev().filter(|tx| filter.matches(tx)).collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(TransactionPage::new(items, total, page))
    }

    async fn summarize(
        &self,
        user_id: AccountId,
        since: Option<DateTime<Utc>>,
    ) -> Result<PeriodSummary, StoreError> {
        let log = self.transactions.read().await;
        let mut summary = PeriodSummary::default();
        let mut categories = BTreeSet::new();

        for tx in log
            .iter()
            .filter(|tx| tx.user_id == user_id && since.is_none_or(|s| tx.created_at >= s))
        {
            summary.transaction_count += 1;
            match tx.kind {
                TransactionType::Credit => summary.total_credits += tx.amount,
                TransactionType::Debit => {
                    summary.total_debits += tx.amount;
                    categories.insert(tx.category);
                }
            }
        }

        summary.total_credits = round2(summary.total_credits);
        summary.total_debits = round2(summary.total_debits);
        summary.categories = categories.into_iter().collect();
        Ok(summary)
    }

    async fn update_details(
        &self,
        id: TransactionId,
        owner: AccountId,
        update: TransactionUpdate,
    ) -> Result<Transaction, StoreError> {
        let mut log = self.transactions.write().await;
        let tx = log
            .iter_mut()
            .find(|tx| tx.id == id && tx.user_id == owner)
            .ok_or(StoreError::TransactionNotFound(id))?;

        if let Some(description) = update.description {
            tx.description = description;
        }
        if let Some(category) = update.category {
            tx.category = category;
        }
        Ok(tx.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::BankDetails;
    use crate::ledger::{Category, Posting, TransactionDraft};

    fn new_account(email: &str, phone: &str) -> NewAccount {
        NewAccount {
            name: "Test User".into(),
            email: email.into(),
            phone: phone.into(),
            account_number: None,
            bank: BankDetails {
                bank_name: "Home Bank".into(),
                ..Default::default()
            },
        }
    }

    fn draft(kind: TransactionType, cents: i64) -> TransactionDraft {
        TransactionDraft {
            kind,
            amount: Decimal::new(cents, 2),
            fee: Decimal::ZERO,
            description: "test".into(),
            category: Category::Other,
            transfer_type: None,
            counterparty: None,
        }
    }

    #[tokio::test]
    async fn test_open_account_uniqueness() {
        let store = InMemoryStore::new();
        let a = store.open_account(new_account("a@x.io", "111")).await.unwrap();
        assert_eq!(a.balance, Decimal::ZERO);
        assert_eq!(a.account_number.len(), 12);

        let dup = store.open_account(new_account("A@X.io", "222")).await;
        assert!(matches!(dup, Err(StoreError::Duplicate(_))));

        let mut explicit = new_account("b@x.io", "222");
        explicit.account_number = Some(a.account_number.clone());
        let dup = store.open_account(explicit).await;
        assert!(matches!(dup, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_phone_limit() {
        let store = InMemoryStore::new();
        for i in 0..MAX_ACCOUNTS_PER_PHONE {
            store
                .open_account(new_account(&format!("{}@x.io", i), "555"))
                .await
                .unwrap();
        }
        let over = store.open_account(new_account("extra@x.io", "555")).await;
        assert!(matches!(over, Err(StoreError::PhoneLimitReached(_))));
        assert_eq!(store.find_by_phone("555").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_apply_rejects_overdraft_without_mutation() {
        let store = InMemoryStore::new();
        let a = store.open_account(new_account("a@x.io", "1")).await.unwrap();
        store
            .apply(PostingBatch::single(a.id, draft(TransactionType::Credit, 10000), None))
            .await
            .unwrap();

        let err = store
            .apply(PostingBatch::single(a.id, draft(TransactionType::Debit, 15000), None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InsufficientBalance { .. }));

        let account = store.get(a.id).await.unwrap().unwrap();
        assert_eq!(account.balance, Decimal::new(10000, 2));
        let page = store
            .list_transactions(&TransactionFilter::for_user(a.id), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_apply_pair_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let a = store.open_account(new_account("a@x.io", "1")).await.unwrap();
        let b = store.open_account(new_account("b@x.io", "2")).await.unwrap();
        store
            .apply(PostingBatch::single(a.id, draft(TransactionType::Credit, 5000), None))
            .await
            .unwrap();
        store.set_status(b.id, AccountStatus::Suspended).await.unwrap();

        let batch = PostingBatch {
            initiator: a.id,
            idempotency_key: None,
            postings: vec![
                Posting {
                    account_id: a.id,
                    draft: draft(TransactionType::Debit, 1000),
                },
                Posting {
                    account_id: b.id,
                    draft: draft(TransactionType::Credit, 1000),
                },
            ],
        };
        let err = store.apply(batch).await.unwrap_err();
        assert!(matches!(err, StoreError::AccountInactive(id) if id == b.id));
        assert_eq!(store.get(a.id).await.unwrap().unwrap().balance, Decimal::new(5000, 2));
    }

    #[tokio::test]
    async fn test_idempotent_replay() {
        let store = InMemoryStore::new();
        let a = store.open_account(new_account("a@x.io", "1")).await.unwrap();
        let key = Some("req-1".to_string());

        let first = store
            .apply(PostingBatch::single(a.id, draft(TransactionType::Credit, 2500), key.clone()))
            .await
            .unwrap();
        let second = store
            .apply(PostingBatch::single(a.id, draft(TransactionType::Credit, 2500), key))
            .await
            .unwrap();

        assert!(!first.is_replay());
        assert!(second.is_replay());
        assert_eq!(first.transactions()[0].id, second.transactions()[0].id);
        assert_eq!(store.get(a.id).await.unwrap().unwrap().balance, Decimal::new(2500, 2));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_update_details() {
        let store = InMemoryStore::new();
        let a = store.open_account(new_account("a@x.io", "1")).await.unwrap();
        for cents in [100, 200, 300] {
            store
                .apply(PostingBatch::single(a.id, draft(TransactionType::Credit, cents), None))
                .await
                .unwrap();
        }

        let page = store
            .list_transactions(
                &TransactionFilter::for_user(a.id),
                PageRequest::new(Some(1), Some(2)),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.transactions[0].amount, Decimal::new(300, 2));
        assert_eq!(page.transactions[0].balance, Decimal::new(600, 2));

        let id = page.transactions[0].id;
        let updated = store
            .update_details(
                id,
                a.id,
                TransactionUpdate {
                    description: Some("renamed".into()),
                    category: Some(Category::Salary),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, "renamed");
        assert_eq!(updated.amount, Decimal::new(300, 2));

        let foreign = store.update_details(id, a.id + 1, TransactionUpdate::default()).await;
        assert!(matches!(foreign, Err(StoreError::TransactionNotFound(_))));
    }
}
