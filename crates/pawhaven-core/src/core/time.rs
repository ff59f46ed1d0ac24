// pawhaven-core/src/core/time.rs
// ============================================================================
// Module: PawHaven Time Model
// Description: Timestamp and calendar helpers for shelter records.
// Purpose: Keep record time explicit and caller-supplied.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Records carry unix-millisecond timestamps and calendar dates. The core
//! never reads the wall clock; hosts supply `now` and `today` on every call
//! that stamps or compares time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Milliseconds per minute.
const MILLIS_PER_MINUTE: i64 = 60_000;

/// Unix epoch milliseconds used on every persisted record.
///
/// # Invariants
/// - Values are provided by callers; the core never reads wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns a timestamp offset by the given number of minutes.
    #[must_use]
    pub fn plus_minutes(self, minutes: u32) -> Self {
        Self(self.0.saturating_add(i64::from(minutes).saturating_mul(MILLIS_PER_MINUTE)))
    }

    /// Converts the timestamp into a UTC date-time, if representable.
    #[must_use]
    pub fn to_datetime(self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * 1_000_000).ok()
    }

    /// Returns the UTC calendar date of the timestamp.
    #[must_use]
    pub fn date(self) -> Option<Date> {
        self.to_datetime().map(OffsetDateTime::date)
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        let millis = value.unix_timestamp_nanos() / 1_000_000;
        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }
}

// ============================================================================
// SECTION: Calendar Dates
// ============================================================================

/// Parses an ISO `YYYY-MM-DD` calendar date.
#[must_use]
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Formats a calendar date as ISO `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]")).unwrap_or_default()
}

/// Returns the whole number of days from `earlier` to `later`.
#[must_use]
pub fn days_between(earlier: Date, later: Date) -> i64 {
    (later - earlier).whole_days()
}

/// Returns the date `days` days before `date`, saturating at the minimum date.
#[must_use]
pub fn days_before(date: Date, days: u32) -> Date {
    date.checked_sub(Duration::days(i64::from(days))).unwrap_or(Date::MIN)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
