//! User input for deposit operations.

use super::model::LockPeriod;
use crate::amount::TokenAmount;
use crate::error::{FtgpError, Result};
use std::fmt;
use std::str::FromStr;

/// The deposit type selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositKind {
    Open,
    Lockup,
}

impl FromStr for DepositKind {
    type Err = FtgpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(DepositKind::Open),
            "lockup" | "locked" => Ok(DepositKind::Lockup),
            other => Err(FtgpError::invalid_input(format!(
                "unknown deposit type '{}' (expected 'open' or 'lockup')",
                other
            ))),
        }
    }
}

impl fmt::Display for DepositKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepositKind::Open => f.write_str("open"),
            DepositKind::Lockup => f.write_str("lockup"),
        }
    }
}

/// A validated request to create a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositRequest {
    pub amount: TokenAmount,
    /// `None` for an open deposit.
    pub lock: Option<LockPeriod>,
}

impl DepositRequest {
    /// Validates raw user input.
    ///
    /// The amount must be strictly positive. A lock-up deposit needs
    /// `lock_days` to be one of 30, 90, 180 or 365; it is ignored for an
    /// open deposit.
    pub fn parse(amount: &str, kind: DepositKind, lock_days: Option<u32>) -> Result<Self> {
        let amount = TokenAmount::parse_positive(amount)?;
        let lock = match kind {
            DepositKind::Open => None,
            DepositKind::Lockup => {
                let days = lock_days
                    .ok_or_else(|| FtgpError::invalid_input("lock-up period is required"))?;
                let period = LockPeriod::from_days(days).ok_or_else(|| {
                    let choices: Vec<String> =
                        LockPeriod::ALL.iter().map(ToString::to_string).collect();
                    FtgpError::invalid_input(format!(
                        "{} days is not a valid lock-up period (choose {})",
                        days,
                        choices.join(", ")
                    ))
                })?;
                Some(period)
            }
        };
        Ok(Self { amount, lock })
    }

    pub fn kind(&self) -> DepositKind {
        if self.lock.is_some() {
            DepositKind::Lockup
        } else {
            DepositKind::Open
        }
    }
}

/// Parses a manually entered deposit id.
pub fn parse_deposit_id(input: &str) -> Result<u64> {
    input
        .trim()
        .parse::<u64>()
        .map_err(|_| FtgpError::invalid_input(format!("'{}' is not a valid deposit ID", input.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_request_ignores_lock_days() {
        let request = DepositRequest::parse("10", DepositKind::Open, Some(7)).unwrap();
        assert_eq!(request.lock, None);
        assert_eq!(request.kind(), DepositKind::Open);
    }

    #[test]
    fn test_lockup_request_requires_known_period() {
        let request = DepositRequest::parse("10", DepositKind::Lockup, Some(90)).unwrap();
        assert_eq!(request.lock, Some(LockPeriod::Days90));

        for days in [0, 1, 29, 31, 60, 364, 366] {
            assert!(matches!(
                DepositRequest::parse("10", DepositKind::Lockup, Some(days)),
                Err(FtgpError::InvalidInput(_))
            ));
        }
        assert!(DepositRequest::parse("10", DepositKind::Lockup, None).is_err());
    }

    #[test]
    fn test_invalid_period_lists_choices_with_rates() {
        let err = DepositRequest::parse("10", DepositKind::Lockup, Some(45)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("45 days is not a valid lock-up period"));
        assert!(message.contains("30 days - 3%"));
        assert!(message.contains("365 days - 12%"));
    }

    #[test]
    fn test_request_rejects_non_positive_amount() {
        assert!(DepositRequest::parse("0", DepositKind::Open, None).is_err());
        assert!(DepositRequest::parse("-5", DepositKind::Open, None).is_err());
        assert!(DepositRequest::parse("abc", DepositKind::Open, None).is_err());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("open".parse::<DepositKind>().unwrap(), DepositKind::Open);
        assert_eq!("Locked".parse::<DepositKind>().unwrap(), DepositKind::Lockup);
        assert!("fixed".parse::<DepositKind>().is_err());
    }

    #[test]
    fn test_parse_deposit_id() {
        assert_eq!(parse_deposit_id(" 3 ").unwrap(), 3);
        assert!(parse_deposit_id("-1").is_err());
        assert!(parse_deposit_id("1.5").is_err());
        assert!(parse_deposit_id("").is_err());
    }
}
