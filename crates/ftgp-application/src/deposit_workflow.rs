//! Deposit workflow.
//!
//! Creates deposits, enumerates them, queries accrued interest and withdraws,
//! keeping a local view that only ever reflects confirmed ledger reads.

use crate::session::{LedgerSession, log_remote_failure};
use ftgp_core::account::AccountAddress;
use ftgp_core::amount::TokenAmount;
use ftgp_core::config::WorkflowConfig;
use ftgp_core::deposit::{DepositKind, DepositRecord, DepositRequest, parse_deposit_id};
use ftgp_core::error::{FtgpError, LedgerError, Result};
use ftgp_core::ledger::{LedgerCall, TxReceipt};
use ftgp_core::operation::{OperationKind, OperationPhase};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A consistent snapshot of the workflow state for rendering.
#[derive(Debug, Clone)]
pub struct DepositView {
    pub account: AccountAddress,
    pub deposits: Arc<Vec<DepositRecord>>,
    pub interest: Option<TokenAmount>,
    pub last_message: Option<String>,
    pub phase: OperationPhase,
}

/// Deposit list tagged with the refresh that produced it.
struct PublishedDeposits {
    generation: u64,
    records: Arc<Vec<DepositRecord>>,
}

/// Orchestrates the deposit page against the ledger.
///
/// The deposit list is replaced as a whole after every confirmed write and
/// on explicit refresh; readers never observe a partially fetched list.
pub struct DepositWorkflow {
    session: Arc<LedgerSession>,
    deposits: RwLock<PublishedDeposits>,
    interest: RwLock<Option<TokenAmount>>,
    refresh_counter: AtomicU64,
    max_probe: u64,
}

impl DepositWorkflow {
    pub fn new(session: Arc<LedgerSession>, config: &WorkflowConfig) -> Self {
        Self {
            session,
            deposits: RwLock::new(PublishedDeposits {
                generation: 0,
                records: Arc::new(Vec::new()),
            }),
            interest: RwLock::new(None),
            refresh_counter: AtomicU64::new(0),
            max_probe: config.max_deposit_probe,
        }
    }

    pub fn session(&self) -> &Arc<LedgerSession> {
        &self.session
    }

    /// The deposit list as last fetched. May be stale relative to the ledger.
    pub async fn deposits(&self) -> Arc<Vec<DepositRecord>> {
        Arc::clone(&self.deposits.read().await.records)
    }

    pub async fn interest(&self) -> Option<TokenAmount> {
        *self.interest.read().await
    }

    pub async fn view(&self) -> DepositView {
        DepositView {
            account: self.session.account().clone(),
            deposits: self.deposits().await,
            interest: self.interest().await,
            last_message: self.session.last_message().await,
            phase: self.session.gate().phase(),
        }
    }

    /// Creates an open or lock-up deposit.
    ///
    /// The gate is claimed first and input validated inside it, so while
    /// another write is pending even malformed input gets
    /// [`FtgpError::OperationInProgress`]. Nothing is sent before validation
    /// passes. On confirmation the deposit list is re-fetched, since the new
    /// id is assigned by the ledger.
    ///
    /// # Errors
    ///
    /// - [`FtgpError::OperationInProgress`] if another write is pending
    /// - [`FtgpError::InvalidInput`] for a bad amount or lock period
    /// - [`FtgpError::RemoteRejected`] / [`FtgpError::RemoteUnavailable`] from the ledger
    pub async fn create_deposit(
        &self,
        amount: &str,
        kind: DepositKind,
        lock_days: Option<u32>,
    ) -> Result<TxReceipt> {
        let guard = self.session.begin(OperationKind::CreateDeposit).await?;

        let request = match DepositRequest::parse(amount, kind, lock_days) {
            Ok(request) => request,
            Err(e) => return Err(self.session.fail(&guard, "Deposit failed", e).await),
        };

        tracing::debug!(
            "[DepositWorkflow] Validated {} deposit of {}",
            request.kind(),
            request.amount
        );
        let call = match request.lock {
            Some(period) => LedgerCall::LockupDeposit {
                amount: request.amount,
                lock_seconds: period.seconds(),
            },
            None => LedgerCall::OpenDeposit {
                amount: request.amount,
            },
        };

        match self.session.submit(&guard, call).await {
            Ok(receipt) => {
                guard.advance(OperationPhase::Succeeded(OperationKind::CreateDeposit));
                self.finish_success("Deposit successful").await;
                Ok(receipt)
            }
            Err(e) => Err(self.session.fail(&guard, "Deposit failed", e).await),
        }
    }

    /// Withdraws a deposit chosen by typing its id.
    pub async fn withdraw_entered(&self, input: &str) -> Result<TxReceipt> {
        match parse_deposit_id(input) {
            Ok(id) => self.withdraw(id).await,
            Err(e) => {
                self.session
                    .set_message("Please enter a valid deposit ID")
                    .await;
                Err(e)
            }
        }
    }

    /// Withdraws deposit `id`.
    ///
    /// The id must be present in the current list. A record already marked
    /// withdrawn is rejected locally without contacting the ledger. On
    /// confirmation the list is re-fetched rather than patched, because a
    /// withdrawal may also realise interest.
    pub async fn withdraw(&self, id: u64) -> Result<TxReceipt> {
        let guard = self.session.begin(OperationKind::Withdraw).await?;

        let record = self.deposits().await.iter().find(|d| d.id == id).cloned();
        match record {
            None => {
                let error = FtgpError::invalid_input(format!(
                    "deposit {} is not in the current list",
                    id
                ));
                return Err(self.session.fail(&guard, "Withdrawal failed", error).await);
            }
            Some(record) if record.withdrawn => {
                guard.advance(OperationPhase::Failed(OperationKind::Withdraw));
                self.session
                    .set_message("This deposit has already been withdrawn")
                    .await;
                return Err(FtgpError::AlreadyWithdrawn { id });
            }
            Some(_) => {}
        }

        match self
            .session
            .submit(&guard, LedgerCall::Withdraw { index: id })
            .await
        {
            Ok(receipt) => {
                guard.advance(OperationPhase::Succeeded(OperationKind::Withdraw));
                self.finish_success("Withdrawal successful").await;
                Ok(receipt)
            }
            Err(e) => Err(self.session.fail(&guard, "Withdrawal failed", e).await),
        }
    }

    /// Re-reads every deposit of the account.
    ///
    /// Indices are probed from zero until the ledger reports no record there.
    /// Any other read failure aborts the refresh and keeps the previous list.
    pub async fn refresh(&self) -> Result<Arc<Vec<DepositRecord>>> {
        let generation = self.refresh_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let account = self.session.account();
        let ledger = self.session.ledger();

        let mut fetched = Vec::new();
        let mut reached_end = false;
        for index in 0..self.max_probe {
            match ledger.get_user_deposit(account, index).await {
                Ok(mut record) => {
                    tracing::debug!("[DepositWorkflow] Probe {} hit", index);
                    record.id = index;
                    fetched.push(record);
                }
                Err(LedgerError::NoRecord { .. }) => {
                    tracing::debug!("[DepositWorkflow] Probe {} missed, end of list", index);
                    reached_end = true;
                    break;
                }
                Err(e) => {
                    let error = log_remote_failure("refresh", e);
                    self.session
                        .set_message(format!("Fetch failed: {}", error))
                        .await;
                    return Err(error);
                }
            }
        }

        if !reached_end {
            tracing::warn!(
                "[DepositWorkflow] Stopped probing after {} deposits without reaching the end",
                self.max_probe
            );
        }

        let records = Arc::new(fetched);
        let mut published = self.deposits.write().await;
        if generation > published.generation {
            published.generation = generation;
            published.records = Arc::clone(&records);
        } else {
            tracing::debug!(
                "[DepositWorkflow] Discarding refresh {} superseded by {}",
                generation,
                published.generation
            );
            return Ok(Arc::clone(&published.records));
        }
        drop(published);

        tracing::info!(
            "[DepositWorkflow] Loaded {} deposits for {}",
            records.len(),
            account.short()
        );
        Ok(records)
    }

    /// Reads the interest accrued on all deposits of the account.
    ///
    /// A pure read: it takes no gate and never changes the deposit list.
    /// A failure only updates the status line.
    pub async fn query_interest(&self) -> Result<TokenAmount> {
        let account = self.session.account();
        match self.session.ledger().calculate_interest(account).await {
            Ok(interest) => {
                *self.interest.write().await = Some(interest);
                self.session
                    .set_message(format!("Interest: {} FTGP", interest))
                    .await;
                Ok(interest)
            }
            Err(e) => {
                let error = log_remote_failure("interest", e);
                self.session
                    .set_message(format!("Interest fetch failed: {}", error))
                    .await;
                Err(error)
            }
        }
    }

    async fn finish_success(&self, message: &str) {
        self.session.set_message(message).await;
        if let Err(e) = self.refresh().await {
            tracing::warn!("[DepositWorkflow] Refresh after confirmed write failed: {}", e);
            self.session
                .set_message(format!("{}, but refreshing deposits failed: {}", message, e))
                .await;
        }
    }
}
