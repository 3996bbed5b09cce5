//! Token operations: balance, mint, transfer, approve and redeem.

use crate::session::{LedgerSession, OperationGuard, log_remote_failure};
use ftgp_core::account::AccountAddress;
use ftgp_core::amount::TokenAmount;
use ftgp_core::currency::{Currency, parse_fiat_amount};
use ftgp_core::error::{FtgpError, Result};
use ftgp_core::ledger::{LedgerCall, TxReceipt};
use ftgp_core::operation::{OperationKind, OperationPhase};
use std::sync::Arc;

pub struct TokenService {
    session: Arc<LedgerSession>,
}

impl TokenService {
    pub fn new(session: Arc<LedgerSession>) -> Self {
        Self { session }
    }

    /// Reads the account's token balance.
    pub async fn balance(&self) -> Result<TokenAmount> {
        self.session
            .ledger()
            .balance_of(self.session.account())
            .await
            .map_err(|e| log_remote_failure("balance", e))
    }

    /// Quotes a fiat-to-fiat conversion without submitting anything.
    pub async fn preview_mint(&self, from: Currency, to: Currency, amount: &str) -> Result<u128> {
        let fiat_amount = parse_fiat_amount(amount)?;
        if from == to {
            return Err(FtgpError::invalid_input(
                "cannot convert to the same currency",
            ));
        }
        self.session
            .ledger()
            .preview_conversion(from, to, fiat_amount)
            .await
            .map_err(|e| log_remote_failure("preview", e))
    }

    /// Converts a whole fiat amount and mints the resulting tokens.
    pub async fn mint(&self, currency: Currency, amount: &str) -> Result<TxReceipt> {
        let guard = self.session.begin(OperationKind::Mint).await?;
        let fiat_amount = match parse_fiat_amount(amount) {
            Ok(value) => value,
            Err(e) => return Err(self.session.fail(&guard, "Conversion failed", e).await),
        };

        let call = LedgerCall::ConvertAndMint {
            currency,
            fiat_amount,
        };
        self.finish(&guard, call, "FTGP minted", "Conversion failed")
            .await
    }

    /// Sends tokens to another account.
    pub async fn transfer(&self, to: &str, amount: &str) -> Result<TxReceipt> {
        let guard = self.session.begin(OperationKind::Transfer).await?;
        if to.trim().is_empty() || amount.trim().is_empty() {
            let error = FtgpError::invalid_input("Please enter recipient and amount");
            return Err(self.session.fail(&guard, "Transfer failed", error).await);
        }
        let parsed = AccountAddress::parse(to)
            .and_then(|to| TokenAmount::parse_positive(amount).map(|amount| (to, amount)));
        let (to, amount) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => return Err(self.session.fail(&guard, "Transfer failed", e).await),
        };

        let call = LedgerCall::TransferTokens { to, amount };
        match self.session.submit(&guard, call).await {
            Ok(receipt) => {
                guard.advance(OperationPhase::Succeeded(OperationKind::Transfer));
                self.session.set_message("Transfer successful").await;
                Ok(receipt)
            }
            Err(e) => {
                guard.advance(OperationPhase::Failed(OperationKind::Transfer));
                let message = if e.to_string().to_lowercase().contains("insufficient") {
                    "Insufficient balance".to_string()
                } else {
                    format!("Transfer failed: {}", e)
                };
                self.session.set_message(message).await;
                Err(e)
            }
        }
    }

    /// Allows `spender` to move up to `amount` tokens on the account's behalf.
    pub async fn approve(&self, spender: &str, amount: &str) -> Result<TxReceipt> {
        let guard = self.session.begin(OperationKind::Approve).await?;
        let parsed = AccountAddress::parse(spender)
            .and_then(|spender| TokenAmount::parse_positive(amount).map(|amount| (spender, amount)));
        let (spender, amount) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => return Err(self.session.fail(&guard, "Approve failed", e).await),
        };

        let call = LedgerCall::Approve { spender, amount };
        self.finish(&guard, call, "Approve successful", "Approve failed")
            .await
    }

    /// Redeems tokens for fiat.
    ///
    /// Checks the balance first and fails without any write when it is short.
    /// If the ledger's allowance is below the amount, an approval is
    /// submitted and confirmed before the redemption itself.
    pub async fn redeem(&self, currency: Currency, amount: &str) -> Result<TxReceipt> {
        let guard = self.session.begin(OperationKind::Redeem).await?;
        let amount = match TokenAmount::parse_positive(amount) {
            Ok(amount) => amount,
            Err(e) => return Err(self.session.fail(&guard, "Redemption failed", e).await),
        };

        self.session.set_message("Validating balance...").await;
        let balance = match self.balance().await {
            Ok(balance) => balance,
            Err(e) => return Err(self.session.fail(&guard, "Redemption failed", e).await),
        };
        if balance < amount {
            guard.advance(OperationPhase::Failed(OperationKind::Redeem));
            let error = FtgpError::InsufficientBalance {
                available: balance.to_string(),
            };
            self.session.set_message(error.to_string()).await;
            return Err(error);
        }

        let ledger = self.session.ledger();
        let spender = ledger.address().clone();
        let allowance = match ledger.allowance(self.session.account(), &spender).await {
            Ok(allowance) => allowance,
            Err(e) => {
                let error = log_remote_failure("allowance", e);
                return Err(self.session.fail(&guard, "Redemption failed", error).await);
            }
        };

        if allowance < amount {
            tracing::info!(
                "[TokenService] Allowance {} below {}, approving ledger first",
                allowance,
                amount
            );
            self.session.set_message("Approving token usage...").await;
            let approve = LedgerCall::Approve { spender, amount };
            if let Err(e) = self.session.submit(&guard, approve).await {
                return Err(self.session.fail(&guard, "Redemption failed", e).await);
            }
        }

        self.session.set_message("Initiating redemption...").await;
        let call = LedgerCall::RedeemTokens { currency, amount };
        self.finish(
            &guard,
            call,
            "Redemption successful! Funds will be processed off-chain.",
            "Redemption failed",
        )
        .await
    }

    async fn finish(
        &self,
        guard: &OperationGuard,
        call: LedgerCall,
        success: &str,
        failure: &str,
    ) -> Result<TxReceipt> {
        match self.session.submit(guard, call).await {
            Ok(receipt) => {
                guard.advance(OperationPhase::Succeeded(guard.kind()));
                self.session.set_message(success).await;
                Ok(receipt)
            }
            Err(e) => Err(self.session.fail(guard, failure, e).await),
        }
    }
}
