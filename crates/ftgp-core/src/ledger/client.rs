use super::call::LedgerCall;
use super::transaction::TxHandle;
use crate::account::AccountAddress;
use crate::amount::TokenAmount;
use crate::currency::Currency;
use crate::deposit::DepositRecord;
use crate::error::LedgerError;
use crate::loan::LoanRecord;
use async_trait::async_trait;

/// Read access to the external ledger.
///
/// Reads reflect confirmed state only: a write submitted through a
/// [`WalletSession`] is not visible here until its handle is confirmed.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// The ledger's own address (used as the spender for redemptions).
    fn address(&self) -> &AccountAddress;

    async fn balance_of(&self, account: &AccountAddress) -> Result<TokenAmount, LedgerError>;

    /// Reads the deposit at `index`.
    ///
    /// Returns [`LedgerError::NoRecord`] past the last deposit. The ledger has
    /// no length accessor, so callers enumerate until that miss.
    async fn get_user_deposit(
        &self,
        account: &AccountAddress,
        index: u64,
    ) -> Result<DepositRecord, LedgerError>;

    async fn calculate_interest(&self, account: &AccountAddress)
        -> Result<TokenAmount, LedgerError>;

    async fn allowance(
        &self,
        owner: &AccountAddress,
        spender: &AccountAddress,
    ) -> Result<TokenAmount, LedgerError>;

    /// Quotes a whole-unit fiat conversion without submitting anything.
    async fn preview_conversion(
        &self,
        from: Currency,
        to: Currency,
        fiat_amount: u64,
    ) -> Result<u128, LedgerError>;

    /// The account's loan, or `None` when it has never borrowed.
    async fn user_loan(&self, account: &AccountAddress) -> Result<Option<LoanRecord>, LedgerError>;
}

/// A connected wallet that can sign and submit writes.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// The connected account, or `None` when no account is authorised.
    async fn account(&self) -> Result<Option<AccountAddress>, LedgerError>;

    /// Signs and submits `call`. The returned handle must still be awaited.
    async fn send_transaction(&self, call: LedgerCall) -> Result<TxHandle, LedgerError>;
}
