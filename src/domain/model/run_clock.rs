use crate::domain::model::candle::CANDLE_INTERVAL_SECS;
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// The single "now" of one run, captured once and handed to every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunClock {
    unix: i64,
    checked_at: NaiveDateTime,
}

impl RunClock {
    pub fn now() -> Self {
        let now = Utc::now().trunc_subsecs(0);
        Self {
            unix: now.timestamp(),
            checked_at: now.naive_utc(),
        }
    }

    /// `None` when `unix` has no calendar representation.
    pub fn at(unix: i64) -> Option<Self> {
        unix_to_naive(unix).map(|checked_at| Self { unix, checked_at })
    }

    pub fn unix(&self) -> i64 {
        self.unix
    }

    /// Value written to `last_checked_for_trading`.
    pub fn checked_at(&self) -> NaiveDateTime {
        self.checked_at
    }

    /// Candles are fetched while the cursor is below this point (now minus one interval).
    pub fn sync_ceiling(&self) -> i64 {
        self.unix - CANDLE_INTERVAL_SECS
    }
}

/// UTC unix seconds -> naive UTC datetime as stored in MySQL `DATETIME` columns.
pub fn unix_to_naive(unix: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(unix, 0).map(|dt| dt.naive_utc())
}

pub fn naive_to_unix(at: &NaiveDateTime) -> i64 {
    at.and_utc().timestamp()
}
