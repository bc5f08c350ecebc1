//! Account Directory
//!
//! Resolves identifiers (id, email, phone, account number) to accounts.
//! Balances are only ever changed through [`crate::ledger::LedgerStore::apply`].

pub mod directory;
pub mod models;

pub use directory::AccountDirectory;
pub use models::{
    Account, AccountStatus, BankDetails, MAX_ACCOUNTS_PER_PHONE, NewAccount,
    generate_account_number,
};
