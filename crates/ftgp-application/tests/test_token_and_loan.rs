mod common;

use common::{LEDGER, ScriptedLedger, connect};
use ftgp_application::{DepositWorkflow, LedgerSession, LoanService, TokenService};
use ftgp_core::account::AccountAddress;
use ftgp_core::amount::TokenAmount;
use ftgp_core::config::{FtgpConfig, LoanConfig, WorkflowConfig};
use ftgp_core::currency::Currency;
use ftgp_core::deposit::DepositKind;
use ftgp_core::error::FtgpError;
use ftgp_core::ledger::LedgerCall;
use ftgp_core::operation::OperationKind;
use ftgp_infrastructure::connect_ledger;
use std::sync::Arc;

const RECIPIENT: &str = "0x00000000000000000000000000000000000000b2";

#[tokio::test]
async fn test_redeem_approves_only_when_allowance_is_short() {
    let ledger = ScriptedLedger::new();
    let session = connect(&ledger).await;
    let tokens = TokenService::new(Arc::clone(&session));

    tokens.redeem(Currency::Usd, "50").await.unwrap();
    assert_eq!(ledger.write_methods(), vec!["approve", "redeemTokens"]);
    assert_eq!(
        ledger.writes.lock().unwrap()[0],
        LedgerCall::Approve {
            spender: AccountAddress::parse(LEDGER).unwrap(),
            amount: TokenAmount::from_whole(50),
        }
    );

    ledger.writes.lock().unwrap().clear();
    tokens.redeem(Currency::Usd, "20").await.unwrap();
    assert_eq!(ledger.write_methods(), vec!["redeemTokens"]);
    assert_eq!(
        session.last_message().await.as_deref(),
        Some("Redemption successful! Funds will be processed off-chain.")
    );
}

#[tokio::test]
async fn test_redeem_with_short_balance_makes_no_writes() {
    let ledger = ScriptedLedger::new();
    *ledger.balance.lock().unwrap() = TokenAmount::from_whole(5);
    let session = connect(&ledger).await;
    let tokens = TokenService::new(Arc::clone(&session));

    let err = tokens.redeem(Currency::Gbp, "5.01").await.unwrap_err();

    assert_eq!(
        err,
        FtgpError::InsufficientBalance {
            available: "5".to_string()
        }
    );
    assert_eq!(ledger.write_count(), 0);
    assert_eq!(
        session.last_message().await.as_deref(),
        Some("Insufficient balance: 5 FTGP available")
    );
}

#[tokio::test]
async fn test_transfer_validates_and_maps_insufficient_balance() {
    let ledger = ScriptedLedger::new();
    let session = connect(&ledger).await;
    let tokens = TokenService::new(Arc::clone(&session));

    assert!(matches!(
        tokens.transfer("", "10").await,
        Err(FtgpError::InvalidInput(_))
    ));
    assert!(matches!(
        tokens.transfer("not-an-address", "10").await,
        Err(FtgpError::InvalidInput(_))
    ));
    assert_eq!(ledger.write_count(), 0);

    *ledger.reject_next.lock().unwrap() = Some("ERC20: insufficient balance".to_string());
    assert!(tokens.transfer(RECIPIENT, "10").await.is_err());
    assert_eq!(
        session.last_message().await.as_deref(),
        Some("Insufficient balance")
    );

    tokens.transfer(RECIPIENT, "10").await.unwrap();
    assert_eq!(
        ledger.writes.lock().unwrap().last().cloned(),
        Some(LedgerCall::TransferTokens {
            to: AccountAddress::parse(RECIPIENT).unwrap(),
            amount: TokenAmount::from_whole(10),
        })
    );
}

#[tokio::test]
async fn test_mint_and_preview() {
    let ledger = ScriptedLedger::new();
    let session = connect(&ledger).await;
    let tokens = TokenService::new(Arc::clone(&session));

    assert_eq!(
        tokens.preview_mint(Currency::Gbp, Currency::Usd, "100").await.unwrap(),
        200
    );
    assert!(matches!(
        tokens.preview_mint(Currency::Gbp, Currency::Gbp, "100").await,
        Err(FtgpError::InvalidInput(_))
    ));
    assert!(matches!(
        tokens.mint(Currency::Eur, "1.5").await,
        Err(FtgpError::InvalidInput(_))
    ));

    tokens.mint(Currency::Eur, "300").await.unwrap();
    assert_eq!(
        ledger.writes.lock().unwrap().as_slice(),
        &[LedgerCall::ConvertAndMint {
            currency: Currency::Eur,
            fiat_amount: 300,
        }]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_services_share_one_gate() {
    let ledger = ScriptedLedger::new();
    let session = connect(&ledger).await;
    let workflow = Arc::new(DepositWorkflow::new(
        Arc::clone(&session),
        &WorkflowConfig::default(),
    ));
    let tokens = TokenService::new(Arc::clone(&session));
    ledger.hold_confirmations();
    let mut phases = session.gate().subscribe();

    let pending = {
        let workflow = Arc::clone(&workflow);
        tokio::spawn(async move { workflow.create_deposit("1", DepositKind::Open, None).await })
    };
    phases
        .wait_for(|phase| phase.kind() == Some(OperationKind::CreateDeposit) && !phase.is_idle())
        .await
        .unwrap();

    assert!(matches!(
        tokens.mint(Currency::Usd, "10").await,
        Err(FtgpError::OperationInProgress(_))
    ));

    ledger.release();
    pending.await.unwrap().unwrap();
    tokens.mint(Currency::Usd, "10").await.unwrap();
    assert_eq!(ledger.write_methods(), vec!["openDeposit", "convertAndMint"]);
}

#[tokio::test]
async fn test_repay_without_loan_reports_no_active_loan() {
    let ledger = ScriptedLedger::new();
    let session = connect(&ledger).await;
    let loans = LoanService::new(Arc::clone(&session), &LoanConfig::default());

    assert!(matches!(
        loans.repay("", "10").await,
        Err(FtgpError::InvalidInput(_))
    ));
    assert_eq!(ledger.write_count(), 0);

    *ledger.reject_next.lock().unwrap() = Some("execution reverted".to_string());
    assert!(loans.repay("USD", "10").await.is_err());
    assert_eq!(
        session.last_message().await.as_deref(),
        Some("No active loan found")
    );
}

#[tokio::test]
async fn test_borrow_and_estimate() {
    let ledger = ScriptedLedger::new();
    let session = connect(&ledger).await;
    let loans = LoanService::new(Arc::clone(&session), &LoanConfig::default());

    let estimate = loans.estimate("0.5").unwrap();
    assert!((estimate.tokens - 200.0).abs() < 1e-9);
    assert!(loans.estimate("abc").is_none());

    loans.borrow("0.5").await.unwrap();
    assert_eq!(
        ledger.writes.lock().unwrap().as_slice(),
        &[LedgerCall::GetLoan {
            collateral: TokenAmount::parse("0.5").unwrap(),
        }]
    );
    assert_eq!(loans.loan_details().await.unwrap(), None);
}

#[tokio::test]
async fn test_repay_after_full_repayment_reports_no_active_loan() {
    let config = FtgpConfig::default();
    let connection = connect_ledger(&config).await.unwrap();
    let session = LedgerSession::connect(connection.wallet.clone(), connection.ledger.clone())
        .await
        .unwrap();
    let loans = LoanService::new(Arc::clone(&session), &config.loan);

    loans.borrow("1").await.unwrap();
    loans.repay("USD", "1000").await.unwrap();
    let loan = loans.loan_details().await.unwrap().expect("loan record is kept");
    assert!(loan.outstanding().is_zero());

    assert!(matches!(
        loans.repay("USD", "5").await,
        Err(FtgpError::RemoteRejected { .. })
    ));
    assert_eq!(
        session.last_message().await.as_deref(),
        Some("No active loan found")
    );
}
