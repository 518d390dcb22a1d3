//! Table entry with an absolute expiry
//!
//! An `Entry` records the value together with the point in time at which it
//! stops being valid. Liveness is never stored: it is decided by comparing
//! `expiry` against "now" each time the entry is looked at.

use std::time::Duration;

use ttlkv_core::Timestamp;

/// Whether something expiring at `expiry` is dead at `now`
///
/// The boundary (`expiry == now`) counts as expired. Both the read path and
/// the janitor use this predicate.
#[inline]
pub fn is_expired(expiry: Timestamp, now: Timestamp) -> bool {
    expiry <= now
}

/// A stored value and its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    value: String,
    expiry: Timestamp,
}

impl Entry {
    /// Create an entry expiring at `expiry`
    pub fn new(value: String, expiry: Timestamp) -> Self {
        Entry { value, expiry }
    }

    /// Create an entry that lives for `ttl` starting at `now`
    ///
    /// A zero `ttl` yields an entry that is already expired at `now`.
    pub fn with_ttl(value: String, now: Timestamp, ttl: Duration) -> Self {
        Entry::new(value, now.saturating_add(ttl))
    }

    /// Get the value
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the absolute expiry
    #[inline]
    pub fn expiry(&self) -> Timestamp {
        self.expiry
    }

    /// Check if this entry is dead at `now`
    #[inline]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        is_expired(self.expiry, now)
    }
}
