//! Mutating-operation kinds and their lifecycle phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The mutating operations a session can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    CreateDeposit,
    Withdraw,
    Mint,
    Transfer,
    Approve,
    Redeem,
    Borrow,
    Repay,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::CreateDeposit => "deposit",
            OperationKind::Withdraw => "withdrawal",
            OperationKind::Mint => "mint",
            OperationKind::Transfer => "transfer",
            OperationKind::Approve => "approval",
            OperationKind::Redeem => "redemption",
            OperationKind::Borrow => "loan",
            OperationKind::Repay => "repayment",
        };
        f.write_str(label)
    }
}

/// Phase of the current mutating operation.
///
/// `Idle → Validating → Submitted → Confirming → {Succeeded, Failed} → Idle`.
/// There is no retry phase: a retry is a new operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationPhase {
    Idle,
    Validating(OperationKind),
    Submitted(OperationKind),
    Confirming(OperationKind),
    Succeeded(OperationKind),
    Failed(OperationKind),
}

impl OperationPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, OperationPhase::Idle)
    }

    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            OperationPhase::Idle => None,
            OperationPhase::Validating(kind)
            | OperationPhase::Submitted(kind)
            | OperationPhase::Confirming(kind)
            | OperationPhase::Succeeded(kind)
            | OperationPhase::Failed(kind) => Some(*kind),
        }
    }
}

impl Default for OperationPhase {
    fn default() -> Self {
        OperationPhase::Idle
    }
}
