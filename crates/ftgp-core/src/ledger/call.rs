use crate::account::AccountAddress;
use crate::amount::TokenAmount;
use crate::currency::Currency;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A state-changing ledger call, submitted through a [`super::WalletSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum LedgerCall {
    OpenDeposit {
        amount: TokenAmount,
    },
    LockupDeposit {
        amount: TokenAmount,
        lock_seconds: u64,
    },
    Withdraw {
        index: u64,
    },
    Approve {
        spender: AccountAddress,
        amount: TokenAmount,
    },
    /// Converts a whole fiat amount and mints the resulting tokens.
    ConvertAndMint {
        currency: Currency,
        fiat_amount: u64,
    },
    TransferTokens {
        to: AccountAddress,
        amount: TokenAmount,
    },
    RedeemTokens {
        currency: Currency,
        amount: TokenAmount,
    },
    /// Opens a loan against the attached collateral (18-decimal native units).
    GetLoan {
        collateral: TokenAmount,
    },
    ConvertAndRepay {
        currency: Currency,
        fiat_amount: u64,
    },
}

impl LedgerCall {
    /// The contract method name this call maps to.
    pub fn method(&self) -> &'static str {
        match self {
            LedgerCall::OpenDeposit { .. } => "openDeposit",
            LedgerCall::LockupDeposit { .. } => "lockupDeposit",
            LedgerCall::Withdraw { .. } => "withdraw",
            LedgerCall::Approve { .. } => "approve",
            LedgerCall::ConvertAndMint { .. } => "convertAndMint",
            LedgerCall::TransferTokens { .. } => "transferTokens",
            LedgerCall::RedeemTokens { .. } => "redeemTokens",
            LedgerCall::GetLoan { .. } => "getLoan",
            LedgerCall::ConvertAndRepay { .. } => "convertAndRepay",
        }
    }
}

impl fmt::Display for LedgerCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerCall::OpenDeposit { amount } => write!(f, "openDeposit({})", amount),
            LedgerCall::LockupDeposit {
                amount,
                lock_seconds,
            } => write!(f, "lockupDeposit({}, {})", amount, lock_seconds),
            LedgerCall::Withdraw { index } => write!(f, "withdraw({})", index),
            LedgerCall::Approve { spender, amount } => write!(f, "approve({}, {})", spender, amount),
            LedgerCall::ConvertAndMint {
                currency,
                fiat_amount,
            } => write!(f, "convertAndMint({}, {})", currency, fiat_amount),
            LedgerCall::TransferTokens { to, amount } => {
                write!(f, "transferTokens({}, {})", to, amount)
            }
            LedgerCall::RedeemTokens { currency, amount } => {
                write!(f, "redeemTokens({}, {})", currency, amount)
            }
            LedgerCall::GetLoan { collateral } => write!(f, "getLoan{{value: {}}}", collateral),
            LedgerCall::ConvertAndRepay {
                currency,
                fiat_amount,
            } => write!(f, "convertAndRepay({}, {})", currency, fiat_amount),
        }
    }
}
