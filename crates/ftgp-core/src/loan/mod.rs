//! Loan domain module.

mod model;

pub use model::{LoanEstimate, LoanRecord};
