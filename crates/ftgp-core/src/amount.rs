//! Fixed-point token amounts.
//!
//! The ledger stores every balance as an integer count of base units with
//! [`DECIMALS`] fractional digits. User input arrives as decimal strings and
//! is converted here, before any remote call is made.

use crate::error::{FtgpError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits used by the ledger.
pub const DECIMALS: u32 = 18;

const SCALE: u128 = 10u128.pow(DECIMALS);

/// An unsigned token amount in ledger base units (1 token = 10^18 units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    /// Wraps a raw base-unit count.
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Builds an amount of whole tokens.
    pub fn from_whole(tokens: u64) -> Self {
        Self(tokens as u128 * SCALE)
    }

    pub const fn base_units(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Parses a plain decimal string such as `"1"`, `"0.5"` or `" 12.25 "`.
    ///
    /// Signs, exponents, separators and more than [`DECIMALS`] fractional
    /// digits are rejected with [`FtgpError::InvalidInput`].
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        if text.is_empty() {
            return Err(FtgpError::invalid_input("amount is empty"));
        }

        let (whole, frac) = match text.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (text, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid_amount(input));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid_amount(input));
        }
        if frac.len() > DECIMALS as usize {
            return Err(FtgpError::invalid_input(format!(
                "amount '{}' has more than {} fractional digits",
                text, DECIMALS
            )));
        }

        let whole_units = if whole.is_empty() {
            0u128
        } else {
            whole.parse::<u128>().map_err(|_| invalid_amount(input))?
        };

        let frac_units = if frac.is_empty() {
            0u128
        } else {
            let padding = 10u128.pow(DECIMALS - frac.len() as u32);
            frac.parse::<u128>().map_err(|_| invalid_amount(input))? * padding
        };

        whole_units
            .checked_mul(SCALE)
            .and_then(|units| units.checked_add(frac_units))
            .map(Self)
            .ok_or_else(|| FtgpError::invalid_input(format!("amount '{}' is too large", text)))
    }

    /// Parses an amount that must be strictly greater than zero.
    pub fn parse_positive(input: &str) -> Result<Self> {
        let amount = Self::parse(input)?;
        if amount.is_zero() {
            return Err(FtgpError::invalid_input("amount must be greater than zero"));
        }
        Ok(amount)
    }

    /// Renders the amount rounded half-up to two decimals (`"100.00"`).
    pub fn to_display_2dp(&self) -> String {
        let cents = self.0.saturating_add(SCALE / 200) / (SCALE / 100);
        format!("{}.{:02}", cents / 100, cents % 100)
    }

    /// Lossy conversion used for local estimates only.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

fn invalid_amount(input: &str) -> FtgpError {
    FtgpError::invalid_input(format!("'{}' is not a valid amount", input.trim()))
}

impl fmt::Display for TokenAmount {
    /// Shortest exact decimal form: `"1.25"`, `"100"`, `"0.000000000000000001"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:018}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for TokenAmount {
    type Err = FtgpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
