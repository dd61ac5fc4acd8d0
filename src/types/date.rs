//! Calendar-date cache keys.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{CourtsideError, Result};

/// A calendar date in canonical `YYYY-MM-DD` form.
///
/// The sole cache key for availability snapshots. Two keys are equal iff
/// their canonical strings are equal; ordering follows the calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wrap a calendar date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a key from year/month/day, if the combination is a real date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse a canonical `YYYY-MM-DD` string.
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|e| CourtsideError::Decoding(format!("invalid date key {s:?}: {e}")))
    }

    /// Today's date in UTC.
    pub fn today_utc() -> Self {
        Self(Utc::now().date_naive())
    }

    /// The underlying calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Canonical `YYYY-MM-DD` string form.
    pub fn canonical(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// The date `days` calendar days away (negative for the past).
    ///
    /// Saturates at the chrono date range limits rather than wrapping.
    pub fn offset(self, days: i64) -> Self {
        Self(
            self.0
                .checked_add_signed(chrono::TimeDelta::days(days))
                .unwrap_or(self.0),
        )
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Identity of a multi-day range fetch: start date plus day count.
///
/// Used purely for in-flight de-duplication; membership in the pending set
/// is transient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RangeKey {
    /// First date covered by the range.
    pub start: DateKey,
    /// Number of consecutive days, starting at `start`.
    pub days: u16,
}

impl RangeKey {
    /// Build a range key.
    pub fn new(start: DateKey, days: u16) -> Self {
        Self { start, days }
    }

    /// The dates covered by this range, in order.
    pub fn dates(&self) -> impl Iterator<Item = DateKey> + '_ {
        (0..self.days as i64).map(|i| self.start.offset(i))
    }
}
