//! Ledger Bank - personal banking transfer and transaction ledger
//!
//! Deposits, withdrawals and internal/external transfers over a REST gateway,
//! with an append-only ledger whose per-account sum always equals the stored
//! balance.
//!
//! # Modules
//!
//! - [`core_types`] - Core identifiers (AccountId, TransactionId)
//! - [`money`] - Currency scale, rounding and amount parsing
//! - [`fee`] - Processing fee policy
//! - [`account`] - Accounts and the Account Directory contract
//! - [`ledger`] - Transactions, posting batches and the Ledger Store contract
//! - [`store`] - In-memory and PostgreSQL backends
//! - [`transfer`] - Transfer Engine, Recipient Resolver, error taxonomy
//! - [`stats`] - Statistics Aggregator and reconciliation
//! - [`auth`] - JWT bearer authentication
//! - [`gateway`] - axum HTTP surface

// Core types - must be first!
pub mod core_types;

// Domain
pub mod account;
pub mod fee;
pub mod ledger;
pub mod money;
pub mod stats;
pub mod transfer;

// Storage
pub mod db;
pub mod store;

// Service
pub mod auth;
pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use account::{Account, AccountDirectory, AccountStatus, BankDetails};
pub use core_types::{AccountId, TransactionId};
pub use fee::{FeePolicy, compute_fee};
pub use ledger::{Category, LedgerStore, Transaction, TransactionType, TransferType};
pub use stats::{StatisticsAggregator, StatsPeriod, TransactionStats};
pub use store::{InMemoryStore, PgStore};
pub use transfer::{LedgerError, TransferEngine, TransferRequest};
