//! Deposit domain module.
//!
//! # Module Structure
//!
//! - `model`: Deposit records as reported by the ledger (`DepositRecord`),
//!   lock periods and their display rates (`LockPeriod`, `LockTerm`)
//! - `request`: Validated user input for creating a deposit (`DepositRequest`)

mod model;
mod request;

pub use model::{DepositRecord, LockPeriod, LockTerm, SECONDS_PER_DAY};
pub use request::{DepositKind, DepositRequest, parse_deposit_id};
