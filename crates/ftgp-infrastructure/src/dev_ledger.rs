//! In-process development ledger.
//!
//! Stands in for the deployed contract when running the CLI locally or in
//! integration tests. It keeps balances, deposits, allowances and loans in
//! memory and applies each write only when its confirmation completes, so
//! reads stay behind submitted writes exactly as on a real chain.
//!
//! Interest is not computed here. Whatever [`DevLedger::set_accrued_interest`]
//! last stored is what `calculate_interest` reports.

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use ftgp_core::account::AccountAddress;
use ftgp_core::amount::TokenAmount;
use ftgp_core::config::FtgpConfig;
use ftgp_core::currency::Currency;
use ftgp_core::deposit::{DepositRecord, LockPeriod};
use ftgp_core::error::LedgerError;
use ftgp_core::ledger::{LedgerCall, LedgerClient, TxHandle, TxReceipt, WalletSession};
use ftgp_core::loan::LoanRecord;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Tokens lent per whole unit of collateral.
const TOKENS_PER_COLLATERAL_DEFAULT: u128 = 400;
/// Repayment due as a percentage of the principal.
const REPAYMENT_PERCENT: u128 = 105;
const INSTALLMENTS: u128 = 12;

#[derive(Default)]
struct LedgerState {
    balances: HashMap<AccountAddress, TokenAmount>,
    deposits: HashMap<AccountAddress, Vec<DepositRecord>>,
    interest: HashMap<AccountAddress, TokenAmount>,
    allowances: HashMap<(AccountAddress, AccountAddress), TokenAmount>,
    loans: HashMap<AccountAddress, LoanRecord>,
    tx_count: u64,
    block_number: u64,
}

pub struct DevLedger {
    address: AccountAddress,
    state: Mutex<LedgerState>,
    confirmation_delay: Duration,
    tokens_per_collateral: u128,
    clock_offset: AtomicI64,
    offline: AtomicBool,
}

impl DevLedger {
    pub fn new(address: AccountAddress, confirmation_delay: Duration) -> Self {
        Self {
            address,
            state: Mutex::new(LedgerState::default()),
            confirmation_delay,
            tokens_per_collateral: TOKENS_PER_COLLATERAL_DEFAULT,
            clock_offset: AtomicI64::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Builds a ledger from configuration and funds the development account.
    pub async fn from_config(config: &FtgpConfig) -> Arc<Self> {
        let mut ledger = Self::new(
            config.ledger.address.clone(),
            Duration::from_millis(config.dev_ledger.confirmation_delay_ms),
        );
        let rate = (config.loan.eth_usd_price * config.loan.loan_to_value).round();
        if rate >= 1.0 {
            ledger.tokens_per_collateral = rate as u128;
        }
        let ledger = Arc::new(ledger);
        ledger
            .fund(&config.dev_ledger.account, config.dev_ledger.opening_balance)
            .await;
        ledger
    }

    /// Credits `amount` to `account` outside any transaction.
    pub async fn fund(&self, account: &AccountAddress, amount: TokenAmount) {
        let mut state = self.state.lock().await;
        let balance = state.balances.entry(account.clone()).or_default();
        *balance = balance.checked_add(amount).unwrap_or(*balance);
    }

    /// Sets the interest reported for `account`.
    pub async fn set_accrued_interest(&self, account: &AccountAddress, amount: TokenAmount) {
        self.state
            .lock()
            .await
            .interest
            .insert(account.clone(), amount);
    }

    /// Moves the ledger clock forward, e.g. to let a lock period mature.
    pub fn advance_time(&self, seconds: i64) {
        self.clock_offset.fetch_add(seconds, Ordering::SeqCst);
    }

    /// While offline every read and submission fails as unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn now(&self) -> i64 {
        Utc::now().timestamp() + self.clock_offset.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(LedgerError::Unavailable("dev ledger is offline".to_string()))
        } else {
            Ok(())
        }
    }

    /// Accepts `call` from `from` and returns a handle for its confirmation.
    ///
    /// The confirmation runs as its own task, so the write completes even if
    /// the handle is dropped.
    pub async fn submit(
        self: &Arc<Self>,
        from: AccountAddress,
        call: LedgerCall,
    ) -> Result<TxHandle, LedgerError> {
        self.ensure_online()?;
        let tx_hash = {
            let mut state = self.state.lock().await;
            state.tx_count += 1;
            format!("0x{:064x}", state.tx_count)
        };
        tracing::debug!("[DevLedger] Accepted {} as {}", call, tx_hash);

        let ledger = Arc::clone(self);
        let hash = tx_hash.clone();
        let task = tokio::spawn(async move {
            if !ledger.confirmation_delay.is_zero() {
                tokio::time::sleep(ledger.confirmation_delay).await;
            }
            ledger
                .apply(&from, call)
                .await
                .map(|block_number| TxReceipt {
                    tx_hash: hash,
                    block_number,
                })
        });

        let confirmation = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(LedgerError::Unavailable(format!(
                    "confirmation task failed: {}",
                    e
                ))),
            }
        };
        Ok(TxHandle::new(tx_hash, confirmation.boxed()))
    }

    async fn apply(&self, from: &AccountAddress, call: LedgerCall) -> Result<u64, LedgerError> {
        let now = self.now();
        let mut state = self.state.lock().await;
        match call {
            LedgerCall::OpenDeposit { amount } => {
                debit(&mut state, from, amount)?;
                push_deposit(&mut state, from, amount, now, 0);
            }
            LedgerCall::LockupDeposit {
                amount,
                lock_seconds,
            } => {
                if LockPeriod::from_seconds(lock_seconds).is_none() {
                    return Err(rejected("Invalid lock period"));
                }
                debit(&mut state, from, amount)?;
                push_deposit(&mut state, from, amount, now, lock_seconds);
            }
            LedgerCall::Withdraw { index } => {
                let record = state
                    .deposits
                    .get_mut(from)
                    .and_then(|deposits| deposits.get_mut(index as usize))
                    .ok_or_else(|| rejected("Invalid deposit index"))?;
                if record.withdrawn {
                    return Err(rejected("Deposit already withdrawn"));
                }
                if let Some(maturity) = record.maturity_time() {
                    if now < maturity {
                        return Err(rejected("Lock period not ended"));
                    }
                }
                record.withdrawn = true;
                let principal = record.principal;
                credit(&mut state, from, principal)?;
            }
            LedgerCall::Approve { spender, amount } => {
                state.allowances.insert((from.clone(), spender), amount);
            }
            LedgerCall::ConvertAndMint {
                currency: _,
                fiat_amount,
            } => {
                credit(&mut state, from, TokenAmount::from_whole(fiat_amount))?;
            }
            LedgerCall::TransferTokens { to, amount } => {
                debit(&mut state, from, amount)?;
                credit(&mut state, &to, amount)?;
            }
            LedgerCall::RedeemTokens {
                currency: _,
                amount,
            } => {
                let key = (from.clone(), self.address.clone());
                let allowance = state.allowances.get(&key).copied().unwrap_or_default();
                let remaining = allowance
                    .checked_sub(amount)
                    .ok_or_else(|| rejected("Allowance exceeded"))?;
                debit(&mut state, from, amount)?;
                state.allowances.insert(key, remaining);
            }
            LedgerCall::GetLoan { collateral } => {
                if state
                    .loans
                    .get(from)
                    .is_some_and(|loan| !loan.outstanding().is_zero())
                {
                    return Err(rejected("Existing loan still active"));
                }
                let principal = collateral
                    .base_units()
                    .checked_mul(self.tokens_per_collateral)
                    .map(TokenAmount::from_base_units)
                    .ok_or_else(|| rejected("Collateral too large"))?;
                let due = TokenAmount::from_base_units(
                    principal.base_units() / 100 * REPAYMENT_PERCENT,
                );
                credit(&mut state, from, principal)?;
                state.loans.insert(
                    from.clone(),
                    LoanRecord {
                        collateral,
                        principal,
                        start_time: now,
                        repayment_due: due,
                        monthly_installment: TokenAmount::from_base_units(
                            due.base_units() / INSTALLMENTS,
                        ),
                        repaid: TokenAmount::ZERO,
                        borrower: from.clone(),
                    },
                );
            }
            LedgerCall::ConvertAndRepay {
                currency: _,
                fiat_amount,
            } => {
                let loan = state
                    .loans
                    .get_mut(from)
                    .filter(|loan| !loan.outstanding().is_zero())
                    .ok_or_else(|| rejected("No active loan"))?;
                let payment = TokenAmount::from_whole(fiat_amount).min(loan.outstanding());
                loan.repaid = loan.repaid.checked_add(payment).unwrap_or(loan.repayment_due);
            }
        }

        state.block_number += 1;
        Ok(state.block_number)
    }
}

fn rejected(reason: &str) -> LedgerError {
    LedgerError::Rejected(reason.to_string())
}

fn debit(
    state: &mut LedgerState,
    account: &AccountAddress,
    amount: TokenAmount,
) -> Result<(), LedgerError> {
    let balance = state.balances.entry(account.clone()).or_default();
    *balance = balance
        .checked_sub(amount)
        .ok_or_else(|| rejected("Insufficient balance"))?;
    Ok(())
}

fn credit(
    state: &mut LedgerState,
    account: &AccountAddress,
    amount: TokenAmount,
) -> Result<(), LedgerError> {
    let balance = state.balances.entry(account.clone()).or_default();
    *balance = balance
        .checked_add(amount)
        .ok_or_else(|| rejected("Balance overflow"))?;
    Ok(())
}

fn push_deposit(
    state: &mut LedgerState,
    account: &AccountAddress,
    principal: TokenAmount,
    start_time: i64,
    lock_duration: u64,
) {
    let deposits = state.deposits.entry(account.clone()).or_default();
    deposits.push(DepositRecord {
        id: deposits.len() as u64,
        principal,
        start_time,
        lock_duration,
        withdrawn: false,
    });
}

#[async_trait]
impl LedgerClient for DevLedger {
    fn address(&self) -> &AccountAddress {
        &self.address
    }

    async fn balance_of(&self, account: &AccountAddress) -> Result<TokenAmount, LedgerError> {
        self.ensure_online()?;
        let state = self.state.lock().await;
        Ok(state.balances.get(account).copied().unwrap_or_default())
    }

    async fn get_user_deposit(
        &self,
        account: &AccountAddress,
        index: u64,
    ) -> Result<DepositRecord, LedgerError> {
        self.ensure_online()?;
        let state = self.state.lock().await;
        state
            .deposits
            .get(account)
            .and_then(|deposits| deposits.get(index as usize))
            .cloned()
            .ok_or(LedgerError::NoRecord { index })
    }

    async fn calculate_interest(
        &self,
        account: &AccountAddress,
    ) -> Result<TokenAmount, LedgerError> {
        self.ensure_online()?;
        let state = self.state.lock().await;
        Ok(state.interest.get(account).copied().unwrap_or_default())
    }

    async fn allowance(
        &self,
        owner: &AccountAddress,
        spender: &AccountAddress,
    ) -> Result<TokenAmount, LedgerError> {
        self.ensure_online()?;
        let state = self.state.lock().await;
        Ok(state
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default())
    }

    async fn preview_conversion(
        &self,
        _from: Currency,
        _to: Currency,
        fiat_amount: u64,
    ) -> Result<u128, LedgerError> {
        self.ensure_online()?;
        Ok(fiat_amount as u128)
    }

    async fn user_loan(&self, account: &AccountAddress) -> Result<Option<LoanRecord>, LedgerError> {
        self.ensure_online()?;
        let state = self.state.lock().await;
        Ok(state.loans.get(account).cloned())
    }
}

/// A wallet signing for one account on a [`DevLedger`].
pub struct DevWallet {
    account: Option<AccountAddress>,
    ledger: Arc<DevLedger>,
}

impl DevWallet {
    pub fn new(account: AccountAddress, ledger: Arc<DevLedger>) -> Self {
        Self {
            account: Some(account),
            ledger,
        }
    }

    /// A wallet with no authorised account.
    pub fn disconnected(ledger: Arc<DevLedger>) -> Self {
        Self {
            account: None,
            ledger,
        }
    }
}

#[async_trait]
impl WalletSession for DevWallet {
    async fn account(&self) -> Result<Option<AccountAddress>, LedgerError> {
        self.ledger.ensure_online()?;
        Ok(self.account.clone())
    }

    async fn send_transaction(&self, call: LedgerCall) -> Result<TxHandle, LedgerError> {
        let from = self
            .account
            .clone()
            .ok_or_else(|| LedgerError::Rejected("no account authorised".to_string()))?;
        self.ledger.submit(from, call).await
    }
}
