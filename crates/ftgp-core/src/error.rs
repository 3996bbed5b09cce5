//! Error types for the FTGP client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every FTGP workflow.
///
/// Every variant is terminal for the operation that produced it. Nothing in
/// this crate retries on error.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FtgpError {
    /// Local validation failure. No remote call was issued.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No connected wallet account.
    #[error("No wallet connected")]
    NoWallet,

    /// The cached deposit record is already withdrawn.
    #[error("Deposit {id} has already been withdrawn")]
    AlreadyWithdrawn { id: u64 },

    /// Another mutating operation is still in flight.
    #[error("Another operation is in progress: {0}")]
    OperationInProgress(String),

    /// The ledger declined the operation. The reason is the ledger's own text.
    #[error("{reason}")]
    RemoteRejected { reason: String },

    /// The wallet or ledger could not be reached.
    #[error("{0}")]
    RemoteUnavailable(String),

    /// A deposit carries a lock duration outside the known set.
    #[error("Unrecognized lock duration: {seconds} seconds")]
    UnrecognizedLockDuration { seconds: u64 },

    /// The account balance does not cover the requested amount.
    #[error("Insufficient balance: {available} FTGP available")]
    InsufficientBalance { available: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },
}

impl FtgpError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a RemoteRejected error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::RemoteRejected {
            reason: reason.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// True for failures reported by the remote side (rejected or unreachable).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteRejected { .. } | Self::RemoteUnavailable(_)
        )
    }

    /// True for failures detected locally before any remote call.
    pub fn is_local_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::NoWallet
                | Self::AlreadyWithdrawn { .. }
                | Self::OperationInProgress(_)
                | Self::InsufficientBalance { .. }
        )
    }
}

/// Failure reported by a ledger or wallet capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No record exists at the requested index.
    #[error("no record at index {index}")]
    NoRecord { index: u64 },

    /// The ledger reverted or refused the call.
    #[error("{0}")]
    Rejected(String),

    /// The ledger or wallet could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl From<LedgerError> for FtgpError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NoRecord { index } => Self::RemoteRejected {
                reason: format!("no record at index {}", index),
            },
            LedgerError::Rejected(reason) => Self::RemoteRejected { reason },
            LedgerError::Unavailable(message) => Self::RemoteUnavailable(message),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FtgpError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<toml::de::Error> for FtgpError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FtgpError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FtgpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FtgpError>`.
pub type Result<T> = std::result::Result<T, FtgpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_reason_is_verbatim() {
        let err: FtgpError = LedgerError::Rejected("Lock period not ended".to_string()).into();
        assert_eq!(err.to_string(), "Lock period not ended");
        assert!(err.is_remote());
    }

    #[test]
    fn test_unavailable_maps_to_remote_unavailable() {
        let err: FtgpError = LedgerError::Unavailable("connection refused".to_string()).into();
        assert!(matches!(err, FtgpError::RemoteUnavailable(_)));
        assert!(!err.is_local_precondition());
    }

    #[test]
    fn test_local_preconditions() {
        assert!(FtgpError::NoWallet.is_local_precondition());
        assert!(FtgpError::AlreadyWithdrawn { id: 3 }.is_local_precondition());
        assert!(!FtgpError::config("bad").is_local_precondition());
    }
}
