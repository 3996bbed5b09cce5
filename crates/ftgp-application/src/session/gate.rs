use ftgp_core::error::{FtgpError, Result};
use ftgp_core::operation::{OperationKind, OperationPhase};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Allows at most one mutating operation per session.
///
/// A second request while one is pending fails immediately with
/// [`FtgpError::OperationInProgress`]; it is never queued. The current phase
/// is published on a watch channel for the presentation layer.
pub struct OperationGate {
    pending: Mutex<Option<OperationKind>>,
    phase: watch::Sender<OperationPhase>,
}

impl OperationGate {
    pub fn new() -> Self {
        let (phase, _) = watch::channel(OperationPhase::Idle);
        Self {
            pending: Mutex::new(None),
            phase,
        }
    }

    /// Claims the gate for `kind`, moving the phase to `Validating`.
    pub fn try_begin(self: &Arc<Self>, kind: OperationKind) -> Result<OperationGuard> {
        let mut pending = self.lock_pending();
        if let Some(current) = *pending {
            tracing::debug!(
                "[OperationGate] Rejecting {} while {} is pending",
                kind,
                current
            );
            return Err(FtgpError::OperationInProgress(format!(
                "a {} is still pending",
                current
            )));
        }
        *pending = Some(kind);
        drop(pending);

        self.phase.send_replace(OperationPhase::Validating(kind));
        Ok(OperationGuard {
            gate: Arc::clone(self),
            kind,
        })
    }

    /// The operation currently holding the gate, if any.
    pub fn pending(&self) -> Option<OperationKind> {
        *self.lock_pending()
    }

    pub fn phase(&self) -> OperationPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationPhase> {
        self.phase.subscribe()
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<OperationKind>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OperationGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of holding the [`OperationGate`]. Releasing it returns the phase to `Idle`.
pub struct OperationGuard {
    gate: Arc<OperationGate>,
    kind: OperationKind,
}

impl OperationGuard {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub(crate) fn advance(&self, phase: OperationPhase) {
        self.gate.phase.send_replace(phase);
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        *self.gate.lock_pending() = None;
        self.gate.phase.send_replace(OperationPhase::Idle);
    }
}
