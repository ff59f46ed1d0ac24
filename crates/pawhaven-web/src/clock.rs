// pawhaven-web/src/clock.rs
// ============================================================================
// Module: Request Clock
// Description: Wall-clock source for request handlers.
// Purpose: Keep time reads at the edge so the shelter core stays clock-free.
// Dependencies: pawhaven-core, time
// ============================================================================

//! ## Overview
//! Handlers read `now` and `today` through [`Clock`]. The server uses
//! [`SystemClock`]; tests pin time with [`FixedClock`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use pawhaven_core::Timestamp;
use time::Date;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source for handlers.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;

    /// Returns the current UTC calendar date.
    fn today(&self) -> Date {
        self.now().date().unwrap_or_else(|| OffsetDateTime::UNIX_EPOCH.date())
    }
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from(OffsetDateTime::now_utc())
    }
}

/// Settable clock for tests and replays.
pub struct FixedClock {
    /// Current time in unix milliseconds.
    millis: AtomicI64,
}

impl FixedClock {
    /// Creates a clock pinned at `now`.
    #[must_use]
    pub const fn new(now: Timestamp) -> Self {
        Self { millis: AtomicI64::new(now.as_unix_millis()) }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: Timestamp) {
        self.millis.store(now.as_unix_millis(), Ordering::SeqCst);
    }

    /// Moves the clock forward by `minutes`.
    pub fn advance_minutes(&self, minutes: u32) {
        self.set(self.now().plus_minutes(minutes));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_unix_millis(self.millis.load(Ordering::SeqCst))
    }
}
