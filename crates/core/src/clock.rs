//! Time sources
//!
//! Expiration needs a non-decreasing notion of "now". [`MonotonicClock`]
//! provides it from `std::time::Instant`, so wall-clock adjustments (NTP,
//! manual changes) never resurrect or prematurely kill entries.
//! [`ManualClock`] is driven explicitly and makes expiry behavior
//! deterministic in tests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::Timestamp;

/// Source of monotonically non-decreasing timestamps
///
/// Thread safety: implementations are shared between foreground callers
/// and the background janitor, so they must be `Send + Sync`.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current point on this clock's timeline
    fn now(&self) -> Timestamp;
}

/// Monotonic clock anchored at its creation instant
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp::from(self.origin.elapsed())
    }
}

/// Manually advanced clock
///
/// Time only moves when [`advance`](ManualClock::advance) or
/// [`set`](ManualClock::set) is called. `set` never moves time backwards.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    /// Create a clock that reads `start` until advanced
    pub fn new(start: Timestamp) -> Self {
        Self {
            micros: AtomicU64::new(start.as_micros()),
        }
    }

    /// Move the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let step = Timestamp::ZERO.saturating_add(by).as_micros();
        // fetch_update never fails when the closure always returns Some
        let _ = self
            .micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
                Some(cur.saturating_add(step))
            });
    }

    /// Move the clock to `to`, ignoring targets in the past
    pub fn set(&self, to: Timestamp) {
        self.micros.fetch_max(to.as_micros(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.load(Ordering::SeqCst))
    }
}
