//! Scripted ledger and wallet for workflow tests.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::FutureExt;
use ftgp_application::LedgerSession;
use ftgp_core::account::AccountAddress;
use ftgp_core::amount::TokenAmount;
use ftgp_core::currency::Currency;
use ftgp_core::deposit::DepositRecord;
use ftgp_core::error::LedgerError;
use ftgp_core::ledger::{LedgerCall, LedgerClient, TxHandle, TxReceipt, WalletSession};
use ftgp_core::loan::LoanRecord;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const ACCOUNT: &str = "0x00000000000000000000000000000000000000a1";
pub const LEDGER: &str = "0x00000000000000000000000000000000000000f0";

pub fn account() -> AccountAddress {
    AccountAddress::parse(ACCOUNT).unwrap()
}

pub fn open_record(id: u64, whole: u64, withdrawn: bool) -> DepositRecord {
    DepositRecord {
        id,
        principal: TokenAmount::from_whole(whole),
        start_time: 1_700_000_000,
        lock_duration: 0,
        withdrawn,
    }
}

/// Ledger double that records every call and applies writes on confirmation.
pub struct ScriptedLedger {
    address: AccountAddress,
    pub deposits: Mutex<Vec<DepositRecord>>,
    pub balance: Mutex<TokenAmount>,
    pub allowance: Mutex<TokenAmount>,
    pub interest: Mutex<TokenAmount>,
    pub loan: Mutex<Option<LoanRecord>>,
    /// Reads at this index fail as unreachable.
    pub fail_read_at: Mutex<Option<u64>>,
    /// The next confirmation is rejected with this reason.
    pub reject_next: Mutex<Option<String>>,
    pub writes: Mutex<Vec<LedgerCall>>,
    pub reads: AtomicUsize,
    release: watch::Sender<bool>,
}

impl ScriptedLedger {
    pub fn new() -> Arc<Self> {
        let (release, _) = watch::channel(true);
        Arc::new(Self {
            address: AccountAddress::parse(LEDGER).unwrap(),
            deposits: Mutex::new(Vec::new()),
            balance: Mutex::new(TokenAmount::from_whole(1000)),
            allowance: Mutex::new(TokenAmount::ZERO),
            interest: Mutex::new(TokenAmount::ZERO),
            loan: Mutex::new(None),
            fail_read_at: Mutex::new(None),
            reject_next: Mutex::new(None),
            writes: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            release,
        })
    }

    pub fn with_deposits(records: Vec<DepositRecord>) -> Arc<Self> {
        let ledger = Self::new();
        *ledger.deposits.lock().unwrap() = records;
        ledger
    }

    /// Confirmations block until [`ScriptedLedger::release`] is called.
    pub fn hold_confirmations(&self) {
        self.release.send_replace(false);
    }

    pub fn release(&self) {
        self.release.send_replace(true);
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_methods(&self) -> Vec<&'static str> {
        self.writes.lock().unwrap().iter().map(|c| c.method()).collect()
    }

    fn apply(&self, call: LedgerCall) -> Result<(), LedgerError> {
        if let Some(reason) = self.reject_next.lock().unwrap().take() {
            return Err(LedgerError::Rejected(reason));
        }
        let mut deposits = self.deposits.lock().unwrap();
        match call {
            LedgerCall::OpenDeposit { amount } => {
                let id = deposits.len() as u64;
                deposits.push(DepositRecord {
                    id,
                    principal: amount,
                    start_time: 1_700_000_100,
                    lock_duration: 0,
                    withdrawn: false,
                });
            }
            LedgerCall::LockupDeposit {
                amount,
                lock_seconds,
            } => {
                let id = deposits.len() as u64;
                deposits.push(DepositRecord {
                    id,
                    principal: amount,
                    start_time: 1_700_000_100,
                    lock_duration: lock_seconds,
                    withdrawn: false,
                });
            }
            LedgerCall::Withdraw { index } => {
                let record = deposits
                    .get_mut(index as usize)
                    .ok_or_else(|| LedgerError::Rejected("Invalid deposit index".to_string()))?;
                if record.withdrawn {
                    return Err(LedgerError::Rejected("Already withdrawn".to_string()));
                }
                record.withdrawn = true;
            }
            LedgerCall::Approve { amount, .. } => {
                *self.allowance.lock().unwrap() = amount;
            }
            _ => {}
        }
        Ok(())
    }

    fn read(&self) -> Result<(), LedgerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    fn address(&self) -> &AccountAddress {
        &self.address
    }

    async fn balance_of(&self, _account: &AccountAddress) -> Result<TokenAmount, LedgerError> {
        self.read()?;
        Ok(*self.balance.lock().unwrap())
    }

    async fn get_user_deposit(
        &self,
        _account: &AccountAddress,
        index: u64,
    ) -> Result<DepositRecord, LedgerError> {
        self.read()?;
        if *self.fail_read_at.lock().unwrap() == Some(index) {
            return Err(LedgerError::Unavailable("connection reset".to_string()));
        }
        self.deposits
            .lock()
            .unwrap()
            .get(index as usize)
            .cloned()
            .ok_or(LedgerError::NoRecord { index })
    }

    async fn calculate_interest(
        &self,
        _account: &AccountAddress,
    ) -> Result<TokenAmount, LedgerError> {
        self.read()?;
        Ok(*self.interest.lock().unwrap())
    }

    async fn allowance(
        &self,
        _owner: &AccountAddress,
        _spender: &AccountAddress,
    ) -> Result<TokenAmount, LedgerError> {
        self.read()?;
        Ok(*self.allowance.lock().unwrap())
    }

    async fn preview_conversion(
        &self,
        _from: Currency,
        _to: Currency,
        fiat_amount: u64,
    ) -> Result<u128, LedgerError> {
        self.read()?;
        Ok(fiat_amount as u128 * 2)
    }

    async fn user_loan(&self, _account: &AccountAddress) -> Result<Option<LoanRecord>, LedgerError> {
        self.read()?;
        Ok(self.loan.lock().unwrap().clone())
    }
}

/// Wallet bound to a [`ScriptedLedger`].
pub struct ScriptedWallet {
    pub ledger: Arc<ScriptedLedger>,
    pub account: Option<AccountAddress>,
}

#[async_trait]
impl WalletSession for ScriptedWallet {
    async fn account(&self) -> Result<Option<AccountAddress>, LedgerError> {
        Ok(self.account.clone())
    }

    async fn send_transaction(&self, call: LedgerCall) -> Result<TxHandle, LedgerError> {
        let number = {
            let mut writes = self.ledger.writes.lock().unwrap();
            writes.push(call.clone());
            writes.len() as u64
        };
        let ledger = Arc::clone(&self.ledger);
        let mut released = self.ledger.release.subscribe();
        let tx_hash = format!("0x{:064x}", number);
        let hash = tx_hash.clone();
        let confirmation = async move {
            released
                .wait_for(|released| *released)
                .await
                .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
            ledger.apply(call)?;
            Ok::<_, LedgerError>(TxReceipt {
                tx_hash: hash,
                block_number: number,
            })
        };
        Ok(TxHandle::new(tx_hash, confirmation.boxed()))
    }
}

pub async fn connect(ledger: &Arc<ScriptedLedger>) -> Arc<LedgerSession> {
    let wallet = Arc::new(ScriptedWallet {
        ledger: Arc::clone(ledger),
        account: Some(account()),
    });
    LedgerSession::connect(wallet, ledger.clone()).await.unwrap()
}
