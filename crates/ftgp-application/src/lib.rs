//! Application layer for the FTGP client.
//!
//! Use cases that sequence reads and writes against the external ledger:
//! the deposit workflow, token operations and loans. All of them share one
//! [`LedgerSession`] and therefore one single-flight operation gate.

pub mod deposit_workflow;
pub mod loan_service;
pub mod session;
pub mod token_service;

pub use deposit_workflow::{DepositView, DepositWorkflow};
pub use loan_service::LoanService;
pub use session::{LedgerSession, OperationGate, OperationGuard};
pub use token_service::TokenService;
