//! Connected ledger session.
//!
//! - `gate`: Single-flight guard for mutating operations (`OperationGate`)
//! - `ledger_session`: Resolved account plus wallet and ledger capabilities
//!   (`LedgerSession`)

mod gate;
mod ledger_session;

pub use gate::{OperationGate, OperationGuard};
pub use ledger_session::LedgerSession;
pub(crate) use ledger_session::log_remote_failure;
