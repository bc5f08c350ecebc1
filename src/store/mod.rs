//! Storage backends implementing both [`crate::account::AccountDirectory`]
//! and [`crate::ledger::LedgerStore`].

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
