//! Infrastructure for the FTGP client: configuration storage and ledger backends.

pub mod config_service;
pub mod dev_ledger;
pub mod ledger;

pub use config_service::ConfigService;
pub use dev_ledger::{DevLedger, DevWallet};
pub use ledger::{LedgerConnection, connect_ledger};
