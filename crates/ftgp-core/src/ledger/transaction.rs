use crate::error::LedgerError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Proof that a submitted write was confirmed by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}

/// A submitted, not yet confirmed, write.
///
/// Holding a handle is not success: the write is complete only once
/// [`TxHandle::wait`] resolves to a receipt. There is no way to cancel a
/// handle; dropping it only stops observing the outcome.
pub struct TxHandle {
    tx_hash: String,
    confirmation: BoxFuture<'static, Result<TxReceipt, LedgerError>>,
}

impl TxHandle {
    pub fn new(
        tx_hash: impl Into<String>,
        confirmation: BoxFuture<'static, Result<TxReceipt, LedgerError>>,
    ) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            confirmation,
        }
    }

    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    /// Waits until the ledger confirms or rejects the write.
    pub async fn wait(self) -> Result<TxReceipt, LedgerError> {
        self.confirmation.await
    }
}

impl fmt::Debug for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxHandle")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}
