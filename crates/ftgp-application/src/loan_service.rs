//! Collateralised loans.

use crate::session::{LedgerSession, log_remote_failure};
use ftgp_core::amount::TokenAmount;
use ftgp_core::config::LoanConfig;
use ftgp_core::currency::{Currency, parse_fiat_amount};
use ftgp_core::error::{FtgpError, Result};
use ftgp_core::ledger::{LedgerCall, TxReceipt};
use ftgp_core::loan::{LoanEstimate, LoanRecord};
use ftgp_core::operation::{OperationKind, OperationPhase};
use std::sync::Arc;

pub struct LoanService {
    session: Arc<LedgerSession>,
    eth_usd_price: f64,
    loan_to_value: f64,
}

impl LoanService {
    pub fn new(session: Arc<LedgerSession>, config: &LoanConfig) -> Self {
        Self {
            session,
            eth_usd_price: config.eth_usd_price,
            loan_to_value: config.loan_to_value,
        }
    }

    /// Indicative token amount for `collateral` native units.
    ///
    /// Purely local; the ledger decides the real amount. Returns `None` for
    /// input that is not a positive amount.
    pub fn estimate(&self, collateral: &str) -> Option<LoanEstimate> {
        let collateral = TokenAmount::parse_positive(collateral).ok()?;
        Some(LoanEstimate::compute(
            collateral,
            self.eth_usd_price,
            self.loan_to_value,
        ))
    }

    /// Opens a loan backed by `collateral`.
    pub async fn borrow(&self, collateral: &str) -> Result<TxReceipt> {
        let guard = self.session.begin(OperationKind::Borrow).await?;
        let collateral = match TokenAmount::parse_positive(collateral) {
            Ok(collateral) => collateral,
            Err(e) => return Err(self.session.fail(&guard, "Loan request failed", e).await),
        };

        match self
            .session
            .submit(&guard, LedgerCall::GetLoan { collateral })
            .await
        {
            Ok(receipt) => {
                guard.advance(OperationPhase::Succeeded(OperationKind::Borrow));
                self.session.set_message("Loan successful").await;
                Ok(receipt)
            }
            Err(e) => Err(self.session.fail(&guard, "Loan request failed", e).await),
        }
    }

    /// The account's loan, or `None` if it has none.
    pub async fn loan_details(&self) -> Result<Option<LoanRecord>> {
        self.session
            .ledger()
            .user_loan(self.session.account())
            .await
            .map_err(|e| log_remote_failure("loan details", e))
    }

    /// Repays part of the loan in a fiat currency.
    ///
    /// When the ledger rejects the repayment and the account has no loan, or
    /// only a fully repaid one, the status line says so instead of echoing
    /// the ledger's reason.
    pub async fn repay(&self, currency: &str, amount: &str) -> Result<TxReceipt> {
        let guard = self.session.begin(OperationKind::Repay).await?;
        if currency.trim().is_empty() || amount.trim().is_empty() {
            let error = FtgpError::invalid_input("Please enter both currency and amount");
            return Err(self.session.fail(&guard, "Repayment failed", error).await);
        }
        let parsed = currency
            .parse::<Currency>()
            .and_then(|currency| parse_fiat_amount(amount).map(|amount| (currency, amount)));
        let (currency, fiat_amount) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => return Err(self.session.fail(&guard, "Repayment failed", e).await),
        };

        let call = LedgerCall::ConvertAndRepay {
            currency,
            fiat_amount,
        };
        match self.session.submit(&guard, call).await {
            Ok(receipt) => {
                guard.advance(OperationPhase::Succeeded(OperationKind::Repay));
                self.session.set_message("Repayment successful").await;
                Ok(receipt)
            }
            Err(e) => {
                let has_active_loan = match self.loan_details().await {
                    Ok(Some(loan)) => !loan.outstanding().is_zero(),
                    Ok(None) => false,
                    Err(_) => true,
                };
                if !has_active_loan {
                    guard.advance(OperationPhase::Failed(OperationKind::Repay));
                    self.session.set_message("No active loan found").await;
                    return Err(e);
                }
                Err(self.session.fail(&guard, "Repayment failed", e).await)
            }
        }
    }
}
