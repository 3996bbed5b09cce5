//! Account addresses.

use crate::error::{FtgpError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A ledger account address: `0x` followed by 40 hex digits.
///
/// Addresses are stored lower-cased so that two spellings of the same
/// account compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let hex = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .ok_or_else(|| invalid_address(text))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid_address(text));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// Builds an address from a compile-time constant known to be well-formed.
    pub(crate) fn from_trusted(text: &str) -> Self {
        Self(text.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form used in status lines, e.g. `0x12ab34cd...ef90`.
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..10], &self.0[self.0.len() - 4..])
    }
}

fn invalid_address(text: &str) -> FtgpError {
    FtgpError::invalid_input(format!("'{}' is not a valid account address", text))
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountAddress {
    type Err = FtgpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
