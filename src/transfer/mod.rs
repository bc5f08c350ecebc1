//! Money movement
//!
//! Deposits, withdrawals and transfers between accounts. Every operation is
//! validated and priced here, then committed as a single posting batch so the
//! sender debit and recipient credit of an internal transfer land together or
//! not at all.
//!
//! # Transfer flow
//!
//! ```text
//! validate amount → resolve recipient → price (fee) → check funds → apply batch
//!                        │
//!                        ├─ Resolved   → internal: debit sender + credit recipient
//!                        ├─ NotFound   → external: debit sender (amount + fee)
//!                        └─ Ambiguous  → abort with candidate list
//! ```

pub mod engine;
pub mod error;
pub mod resolver;
pub mod types;


pub use engine::{TransferEngine, initial_deposit_key};
pub use error::LedgerError;
pub use resolver::{RecipientCandidate, Resolution, resolve};
pub use types::{
    AccountOpening, EstimatedArrival, MovementRequest, OpenAccountRequest, RecipientSummary,
    TransferPreview, TransferReceipt, TransferRequest,
};
