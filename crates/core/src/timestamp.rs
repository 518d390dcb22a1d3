//! Expiry arithmetic on a clock's timeline
//!
//! A `Timestamp` counts microseconds from a [`Clock`](crate::Clock)'s origin.
//! "Now" and every entry's expiry share that unit, so deciding whether an
//! entry is dead is one integer comparison.
//!
//! ```
//! use ttlkv_core::Timestamp;
//! use std::time::Duration;
//!
//! let written = Timestamp::from_millis(10);
//! let expiry = written.saturating_add(Duration::from_millis(5));
//! assert_eq!(expiry.as_millis(), 15);
//! ```

use std::time::Duration;

/// Microseconds since a clock's origin
///
/// Adding a TTL saturates at [`Timestamp::MAX`], which then reads as
/// "never expires".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The clock's origin
    pub const ZERO: Timestamp = Timestamp(0);

    /// Latest representable point; expiries clamp here
    pub const MAX: Timestamp = Timestamp(u64::MAX);

    /// Point `micros` microseconds after the origin
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Point `millis` milliseconds after the origin
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis.saturating_mul(1_000))
    }

    /// Point `secs` seconds after the origin
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1_000_000))
    }

    /// Microseconds since the origin
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Whole milliseconds since the origin
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000
    }

    /// Time elapsed from `earlier` to `self`, or `None` if `earlier` is later
    pub fn duration_since(&self, earlier: Timestamp) -> Option<Duration> {
        self.0.checked_sub(earlier.0).map(Duration::from_micros)
    }

    /// `self + ttl`, clamped to `Timestamp::MAX`
    pub fn saturating_add(&self, ttl: Duration) -> Self {
        Timestamp(self.0.saturating_add(Timestamp::from(ttl).0))
    }
}

impl From<Duration> for Timestamp {
    /// Offset from the origin; durations past `u64::MAX` microseconds clamp
    fn from(offset: Duration) -> Self {
        Timestamp(u64::try_from(offset.as_micros()).unwrap_or(u64::MAX))
    }
}
