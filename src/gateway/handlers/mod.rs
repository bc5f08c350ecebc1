//! HTTP handlers, one file per resource

pub mod account;
pub mod health;
pub mod transactions;
pub mod transfer;

pub use account::{get_my_account, reconcile_my_account};
pub use health::{HealthResponse, health_check};
pub use transactions::{
    CreateTransactionRequest, UpdateTransactionRequest, create_transaction, get_stats,
    get_transaction, list_transactions, update_transaction,
};
pub use transfer::{TransferBody, create_transfer, validate_transfer};

#[cfg(feature = "mock-api")]
pub use account::mock_open_account;
