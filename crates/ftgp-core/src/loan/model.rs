use crate::account::AccountAddress;
use crate::amount::TokenAmount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A collateralised loan as recorded by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    /// Collateral in native units (18 decimals).
    pub collateral: TokenAmount,
    pub principal: TokenAmount,
    /// Unix timestamp (seconds) the loan was opened.
    pub start_time: i64,
    pub repayment_due: TokenAmount,
    pub monthly_installment: TokenAmount,
    pub repaid: TokenAmount,
    pub borrower: AccountAddress,
}

impl LoanRecord {
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_time, 0)
    }

    /// Amount still owed; zero once fully repaid.
    pub fn outstanding(&self) -> TokenAmount {
        self.repayment_due
            .checked_sub(self.repaid)
            .unwrap_or(TokenAmount::ZERO)
    }
}

/// Local, indicative estimate of how many tokens a collateral amount buys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanEstimate {
    pub collateral_usd: f64,
    pub tokens: f64,
}

impl LoanEstimate {
    /// `collateral × price × loan_to_value`.
    pub fn compute(collateral: TokenAmount, eth_usd_price: f64, loan_to_value: f64) -> Self {
        let collateral_usd = collateral.as_f64() * eth_usd_price;
        Self {
            collateral_usd,
            tokens: collateral_usd * loan_to_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outstanding_never_underflows() {
        let loan = LoanRecord {
            collateral: TokenAmount::from_whole(1),
            principal: TokenAmount::from_whole(400),
            start_time: 0,
            repayment_due: TokenAmount::from_whole(420),
            monthly_installment: TokenAmount::from_whole(35),
            repaid: TokenAmount::from_whole(500),
            borrower: AccountAddress::parse("0x0000000000000000000000000000000000000001").unwrap(),
        };
        assert_eq!(loan.outstanding(), TokenAmount::ZERO);
    }

    #[test]
    fn test_estimate_applies_price_and_ltv() {
        let estimate = LoanEstimate::compute(TokenAmount::from_whole(2), 1000.0, 0.4);
        assert!((estimate.collateral_usd - 2000.0).abs() < 1e-9);
        assert!((estimate.tokens - 800.0).abs() < 1e-9);
    }
}
