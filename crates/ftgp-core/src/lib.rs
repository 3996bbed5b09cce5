//! Domain types and capability interfaces for the FTGP client.
//!
//! The ledger itself is external. This crate only describes what the client
//! reads from it, what it submits to it, and how failures are classified.

pub mod account;
pub mod amount;
pub mod config;
pub mod currency;
pub mod deposit;
pub mod error;
pub mod ledger;
pub mod loan;
pub mod operation;

// Re-export common types
pub use account::AccountAddress;
pub use amount::TokenAmount;
pub use currency::Currency;
pub use error::{FtgpError, LedgerError, Result};
