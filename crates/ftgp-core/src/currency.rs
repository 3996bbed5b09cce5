//! Fiat currencies accepted by the mint, redeem and repay calls.

use crate::error::{FtgpError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Gbp,
    Eur,
    Jpy,
    Cny,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Gbp,
        Currency::Eur,
        Currency::Jpy,
        Currency::Cny,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = FtgpError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|currency| currency.code() == code)
            .ok_or_else(|| FtgpError::invalid_input(format!("unsupported currency '{}'", s.trim())))
    }
}

/// Parses a whole, strictly positive fiat amount.
pub fn parse_fiat_amount(input: &str) -> Result<u64> {
    match input.trim().parse::<u64>() {
        Ok(0) => Err(FtgpError::invalid_input("amount must be greater than zero")),
        Ok(amount) => Ok(amount),
        Err(_) => Err(FtgpError::invalid_input(format!(
            "'{}' is not a valid whole amount",
            input.trim()
        ))),
    }
}
