//! Deposit domain model.

use crate::amount::TokenAmount;
use crate::error::{FtgpError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// The fixed set of lock-up periods offered by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockPeriod {
    Days30,
    Days90,
    Days180,
    Days365,
}

impl LockPeriod {
    pub const ALL: [LockPeriod; 4] = [
        LockPeriod::Days30,
        LockPeriod::Days90,
        LockPeriod::Days180,
        LockPeriod::Days365,
    ];

    pub fn days(&self) -> u32 {
        match self {
            LockPeriod::Days30 => 30,
            LockPeriod::Days90 => 90,
            LockPeriod::Days180 => 180,
            LockPeriod::Days365 => 365,
        }
    }

    pub fn seconds(&self) -> u64 {
        self.days() as u64 * SECONDS_PER_DAY
    }

    /// Annual rate shown next to the period, in percent.
    pub fn rate_percent(&self) -> u32 {
        match self {
            LockPeriod::Days30 => 3,
            LockPeriod::Days90 => 5,
            LockPeriod::Days180 => 8,
            LockPeriod::Days365 => 12,
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|period| period.days() == days)
    }

    pub fn from_seconds(seconds: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|period| period.seconds() == seconds)
    }
}

impl fmt::Display for LockPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days - {}%", self.days(), self.rate_percent())
    }
}

/// How a stored deposit is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTerm {
    /// No lock period; withdrawable at any time.
    Open,
    Locked(LockPeriod),
}

/// A deposit as recorded by the ledger for one account.
///
/// Records are owned by the ledger. The client only ever holds read-only
/// copies, refreshed as a whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRecord {
    /// Ledger-assigned index, sequential per account.
    pub id: u64,
    pub principal: TokenAmount,
    /// Unix timestamp (seconds) of creation.
    pub start_time: i64,
    /// Lock duration in seconds; `0` for an open deposit.
    pub lock_duration: u64,
    pub withdrawn: bool,
}

impl DepositRecord {
    pub fn is_open(&self) -> bool {
        self.lock_duration == 0
    }

    /// Resolves the stored duration against the known lock periods.
    ///
    /// A non-zero duration outside the known set is reported as
    /// [`FtgpError::UnrecognizedLockDuration`].
    pub fn lock_term(&self) -> Result<LockTerm> {
        if self.is_open() {
            return Ok(LockTerm::Open);
        }
        LockPeriod::from_seconds(self.lock_duration)
            .map(LockTerm::Locked)
            .ok_or(FtgpError::UnrecognizedLockDuration {
                seconds: self.lock_duration,
            })
    }

    /// Unix timestamp at which a locked deposit matures. `None` for open deposits.
    pub fn maturity_time(&self) -> Option<i64> {
        if self.is_open() {
            None
        } else {
            Some(self.start_time.saturating_add(self.lock_duration as i64))
        }
    }

    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_time, 0)
    }

    pub fn maturity_datetime(&self) -> Option<DateTime<Utc>> {
        self.maturity_time()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Human-readable period, e.g. `"Open"` or `"90 days"`.
    pub fn period_label(&self) -> String {
        if self.is_open() {
            "Open".to_string()
        } else {
            format!("{} days", self.lock_duration / SECONDS_PER_DAY)
        }
    }

    /// Rate label, e.g. `"5%"`. Open deposits report `"-"`.
    pub fn rate_label(&self) -> Result<String> {
        match self.lock_term()? {
            LockTerm::Open => Ok("-".to_string()),
            LockTerm::Locked(period) => Ok(format!("{}%", period.rate_percent())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lock_duration: u64) -> DepositRecord {
        DepositRecord {
            id: 0,
            principal: TokenAmount::from_whole(100),
            start_time: 1_700_000_000,
            lock_duration,
            withdrawn: false,
        }
    }

    #[test]
    fn test_lock_period_lookup() {
        assert_eq!(LockPeriod::from_days(90), Some(LockPeriod::Days90));
        assert_eq!(LockPeriod::from_days(45), None);
        assert_eq!(LockPeriod::from_seconds(365 * 86_400), Some(LockPeriod::Days365));
        assert_eq!(LockPeriod::Days30.seconds(), 2_592_000);
    }

    #[test]
    fn test_open_deposit_has_no_maturity() {
        let open = record(0);
        assert_eq!(open.lock_term().unwrap(), LockTerm::Open);
        assert_eq!(open.maturity_time(), None);
        assert_eq!(open.period_label(), "Open");
        assert_eq!(open.rate_label().unwrap(), "-");
    }

    #[test]
    fn test_locked_deposit_maturity_and_rate() {
        let locked = record(LockPeriod::Days180.seconds());
        assert_eq!(locked.lock_term().unwrap(), LockTerm::Locked(LockPeriod::Days180));
        assert_eq!(locked.maturity_time(), Some(1_700_000_000 + 180 * 86_400));
        assert_eq!(locked.rate_label().unwrap(), "8%");
        assert_eq!(locked.period_label(), "180 days");
    }

    #[test]
    fn test_unknown_duration_is_never_fabricated() {
        let odd = record(12_345);
        assert_eq!(
            odd.rate_label(),
            Err(FtgpError::UnrecognizedLockDuration { seconds: 12_345 })
        );
    }
}
