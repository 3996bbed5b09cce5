use super::gate::{OperationGate, OperationGuard};
use ftgp_core::account::AccountAddress;
use ftgp_core::error::{FtgpError, LedgerError, Result};
use ftgp_core::ledger::{LedgerCall, LedgerClient, TxReceipt, WalletSession};
use ftgp_core::operation::{OperationKind, OperationPhase};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A wallet session bound to one resolved account.
///
/// Created once per page/session by [`LedgerSession::connect`]. Owns the
/// single-flight [`OperationGate`] and the status line shown to the user.
pub struct LedgerSession {
    account: AccountAddress,
    wallet: Arc<dyn WalletSession>,
    ledger: Arc<dyn LedgerClient>,
    gate: Arc<OperationGate>,
    last_message: RwLock<Option<String>>,
}

impl LedgerSession {
    /// Resolves the wallet account.
    ///
    /// # Errors
    ///
    /// - [`FtgpError::NoWallet`] when the wallet exposes no account
    /// - [`FtgpError::RemoteUnavailable`] when the wallet cannot be reached
    pub async fn connect(
        wallet: Arc<dyn WalletSession>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Result<Arc<Self>> {
        let account = wallet
            .account()
            .await
            .map_err(|e| log_remote_failure("connect", e))?
            .ok_or(FtgpError::NoWallet)?;

        tracing::info!(
            "[LedgerSession] Connected account {} to ledger {}",
            account.short(),
            ledger.address().short()
        );

        Ok(Arc::new(Self {
            account,
            wallet,
            ledger,
            gate: Arc::new(OperationGate::new()),
            last_message: RwLock::new(None),
        }))
    }

    pub fn account(&self) -> &AccountAddress {
        &self.account
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    pub fn gate(&self) -> &Arc<OperationGate> {
        &self.gate
    }

    /// Claims the single-flight gate for a mutating operation.
    pub async fn begin(&self, kind: OperationKind) -> Result<OperationGuard> {
        match self.gate.try_begin(kind) {
            Ok(guard) => Ok(guard),
            Err(e) => {
                self.set_message(format!("{} rejected: {}", capitalize(kind), e))
                    .await;
                Err(e)
            }
        }
    }

    /// Submits `call` through the wallet and waits for its confirmation.
    ///
    /// Advances the guard through `Submitted` and `Confirming`. The caller
    /// decides between `Succeeded` and `Failed`.
    pub async fn submit(&self, guard: &OperationGuard, call: LedgerCall) -> Result<TxReceipt> {
        let kind = guard.kind();
        guard.advance(OperationPhase::Submitted(kind));
        tracing::info!("[LedgerSession] Submitting {} for {}", call, kind);

        let handle = self
            .wallet
            .send_transaction(call)
            .await
            .map_err(|e| log_remote_failure(kind, e))?;

        guard.advance(OperationPhase::Confirming(kind));
        tracing::debug!(
            "[LedgerSession] Awaiting confirmation of {}",
            handle.tx_hash()
        );

        let receipt = handle
            .wait()
            .await
            .map_err(|e| log_remote_failure(kind, e))?;

        tracing::info!(
            "[LedgerSession] {} confirmed: tx={} block={}",
            kind,
            receipt.tx_hash,
            receipt.block_number
        );
        Ok(receipt)
    }

    /// Marks the operation as failed and records `"<prefix>: <error>"`.
    pub async fn fail(&self, guard: &OperationGuard, prefix: &str, error: FtgpError) -> FtgpError {
        let kind = guard.kind();
        guard.advance(OperationPhase::Failed(kind));
        if error.is_local_precondition() {
            tracing::debug!("[LedgerSession] {} refused before submission: {}", kind, error);
        } else if !error.is_remote() {
            tracing::warn!("[LedgerSession] {} failed locally: {}", kind, error);
        }
        self.set_message(format!("{}: {}", prefix, error)).await;
        error
    }

    pub async fn set_message(&self, message: impl Into<String>) {
        *self.last_message.write().await = Some(message.into());
    }

    pub async fn last_message(&self) -> Option<String> {
        self.last_message.read().await.clone()
    }
}

/// Logs a remote failure at a level matching its class and converts it.
pub(crate) fn log_remote_failure(context: impl std::fmt::Display, error: LedgerError) -> FtgpError {
    match &error {
        LedgerError::Unavailable(message) => {
            tracing::error!("[LedgerSession] {}: ledger unreachable: {}", context, message)
        }
        LedgerError::Rejected(reason) => {
            tracing::warn!("[LedgerSession] {}: rejected by ledger: {}", context, reason)
        }
        LedgerError::NoRecord { index } => {
            tracing::warn!("[LedgerSession] {}: no record at index {}", context, index)
        }
    }
    error.into()
}

fn capitalize(kind: OperationKind) -> String {
    let label = kind.to_string();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    }
}
