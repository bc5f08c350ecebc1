//! Ledger Store
//!
//! Append-only record of every money movement. A movement is submitted as a
//! [`PostingBatch`] and applied atomically together with the balance changes
//! it implies, so the ledger sum for an account always equals its balance.

pub mod error;
pub mod models;
pub mod store;

pub use error::StoreError;
pub use models::{
    Category, CommitOutcome, Counterparty, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, PageRequest,
    PeriodSummary, Posting, PostingBatch, Transaction, TransactionDraft, TransactionFilter,
    TransactionPage, TransactionType, TransactionUpdate, TransferType,
};
pub use store::LedgerStore;
