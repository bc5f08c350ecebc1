//! Ledger record types
//!
//! Transactions are append-only. After creation only `description` and
//! `category` may change; amount, balance snapshot and type never do.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::account::BankDetails;
use crate::core_types::{AccountId, TransactionId};
use crate::money::{amount_serde, round2};

/// Direction of a ledger entry relative to its owning account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(TransactionType::Credit),
            "debit" => Ok(TransactionType::Debit),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

/// Internal: both parties hold accounts here. External: recipient lives at
/// another bank and only the sender's balance moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    Internal,
    External,
}

impl TransferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::Internal => "internal",
            TransferType::External => "external",
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransferType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "internal" => Ok(TransferType::Internal),
            "external" => Ok(TransferType::External),
            _ => Err(format!("Invalid transfer type: {}", s)),
        }
    }
}

/// Reporting category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Deposit,
    Withdrawal,
    Transfer,
    Bills,
    Shopping,
    Food,
    Transport,
    Entertainment,
    Salary,
    Investment,
    Other,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Deposit,
        Category::Withdrawal,
        Category::Transfer,
        Category::Bills,
        Category::Shopping,
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Salary,
        Category::Investment,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Deposit => "deposit",
            Category::Withdrawal => "withdrawal",
            Category::Transfer => "transfer",
            Category::Bills => "bills",
            Category::Shopping => "shopping",
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Salary => "salary",
            Category::Investment => "investment",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}

/// Recipient / sender linkage, populated only on transfer records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Counterparty {
    /// Set for internal transfers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankDetails>,
}

/// Committed ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[schema(value_type = String)]
    pub id: TransactionId,
    /// Owning account
    pub user_id: AccountId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    /// Owner's balance immediately after this entry (audit snapshot)
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub balance: Decimal,
    /// Processing fee folded into `amount` (external transfers only)
    #[serde(with = "amount_serde")]
    #[schema(value_type = f64)]
    pub fee: Decimal,
    pub description: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_type: Option<TransferType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<Counterparty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Credits positive, debits negative
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Credit => self.amount,
            TransactionType::Debit => -self.amount,
        }
    }
}

/// Transaction contents before the store stamps id, balance and time
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub fee: Decimal,
    pub description: String,
    pub category: Category,
    pub transfer_type: Option<TransferType>,
    pub counterparty: Option<Counterparty>,
}

impl TransactionDraft {
    /// Signed balance change implied by this draft
    pub fn delta(&self) -> Decimal {
        match self.kind {
            TransactionType::Credit => round2(self.amount),
            TransactionType::Debit => -round2(self.amount),
        }
    }

    /// Materialize into a committed record
    pub fn commit(
        self,
        user_id: AccountId,
        balance_after: Decimal,
        idempotency_key: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            user_id,
            kind: self.kind,
            amount: round2(self.amount),
            balance: round2(balance_after),
            fee: round2(self.fee),
            description: self.description,
            category: self.category,
            transfer_type: self.transfer_type,
            counterparty: self.counterparty,
            idempotency_key,
            created_at,
        }
    }
}

/// One balance change plus the ledger entry that records it
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub account_id: AccountId,
    pub draft: TransactionDraft,
}

/// All postings of one money movement; applied together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct PostingBatch {
    /// Account whose request created this batch; owns the idempotency key
    pub initiator: AccountId,
    pub idempotency_key: Option<String>,
    pub postings: Vec<Posting>,
}

impl PostingBatch {
    pub fn single(account_id: AccountId, draft: TransactionDraft, key: Option<String>) -> Self {
        Self {
            initiator: account_id,
            idempotency_key: key,
            postings: vec![Posting { account_id, draft }],
        }
    }

    /// Distinct accounts touched, ascending (lock acquisition order)
    pub fn lock_order(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self.postings.iter().map(|p| p.account_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Result of [`super::LedgerStore::apply`]
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// Balances changed; records in posting order
    Applied(Vec<Transaction>),
    /// Idempotency key already used; initiator's original record(s), nothing changed
    Replayed(Vec<Transaction>),
}

impl CommitOutcome {
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            CommitOutcome::Applied(txs) | CommitOutcome::Replayed(txs) => txs,
        }
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        match self {
            CommitOutcome::Applied(txs) | CommitOutcome::Replayed(txs) => txs,
        }
    }

    pub fn is_replay(&self) -> bool {
        matches!(self, CommitOutcome::Replayed(_))
    }
}

// ============================================================================
// Query types
// ============================================================================

/// Filter for listing one account's transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFilter {
    pub user_id: AccountId,
    pub kind: Option<TransactionType>,
    pub category: Option<Category>,
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub to: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    pub fn for_user(user_id: AccountId) -> Self {
        Self {
            user_id,
            kind: None,
            category: None,
            from: None,
            to: None,
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.user_id == self.user_id
            && self.kind.is_none_or(|k| tx.kind == k)
            && self.category.is_none_or(|c| tx.category == c)
            && self.from.is_none_or(|from| tx.created_at >= from)
            && self.to.is_none_or(|to| tx.created_at <= to)
    }
}

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Clamp to `page >= 1` and `1 <= limit <= MAX_PAGE_LIMIT`
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of transactions, newest first
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl TransactionPage {
    pub fn new(transactions: Vec<Transaction>, total: u64, page: PageRequest) -> Self {
        Self {
            transactions,
            total,
            page: page.page,
            limit: page.limit,
            total_pages: total.div_ceil(page.limit as u64),
        }
    }
}

/// Aggregates over one account's transactions since a point in time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeriodSummary {
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub transaction_count: u64,
    /// Distinct categories of debit entries, sorted
    pub categories: Vec<Category>,
}

/// Owner-editable fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub category: Option<Category>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.category.is_none()
    }
}
