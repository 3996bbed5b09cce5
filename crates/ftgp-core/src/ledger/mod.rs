//! Ledger and wallet capability interfaces.
//!
//! The ledger is an external contract and the wallet an external signer.
//! Both are consumed only through the traits in this module, so the
//! workflows can run against a real node, an in-process development ledger,
//! or a test double.
//!
//! # Module Structure
//!
//! - `call`: Write calls (`LedgerCall`)
//! - `transaction`: Confirmation handles (`TxHandle`, `TxReceipt`)
//! - `client`: Capability traits (`LedgerClient`, `WalletSession`)

mod call;
mod client;
mod transaction;

pub use call::LedgerCall;
pub use client::{LedgerClient, WalletSession};
pub use transaction::{TxHandle, TxReceipt};
