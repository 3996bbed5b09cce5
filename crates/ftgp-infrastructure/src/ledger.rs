//! Ledger construction.
//!
//! [`connect_ledger`] is the only way the client obtains a ledger: the
//! address always comes from `[ledger] address` in the configuration.

use crate::dev_ledger::{DevLedger, DevWallet};
use ftgp_core::config::FtgpConfig;
use ftgp_core::error::Result;
use ftgp_core::ledger::{LedgerClient, WalletSession};
use std::sync::Arc;

/// Capabilities handed to the application layer.
pub struct LedgerConnection {
    pub ledger: Arc<dyn LedgerClient>,
    pub wallet: Arc<dyn WalletSession>,
    /// Operator controls of the development backend (interest, clock).
    pub dev: Arc<DevLedger>,
}

/// Builds the ledger and wallet described by `config`.
pub async fn connect_ledger(config: &FtgpConfig) -> Result<LedgerConnection> {
    config.validate()?;
    let dev = DevLedger::from_config(config).await;
    let wallet = DevWallet::new(config.dev_ledger.account.clone(), Arc::clone(&dev));

    tracing::info!(
        "[Ledger] Using development ledger at {} for account {}",
        config.ledger.address.short(),
        config.dev_ledger.account.short()
    );

    Ok(LedgerConnection {
        ledger: dev.clone(),
        wallet: Arc::new(wallet),
        dev,
    })
}
