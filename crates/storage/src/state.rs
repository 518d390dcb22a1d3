//! Store table and expiry index, updated together
//!
//! `StoreState` is everything the store's single lock protects: the table,
//! the expiry index, the closed flag and the eviction counters. It has no
//! locking and no clock of its own; callers pass "now" in. That keeps the
//! expiration rules deterministic and testable in isolation.
//!
//! # Eviction paths
//!
//! - **Lazy**: `get`/`contains_key` remove the entry they are looking at if
//!   it is expired.
//! - **Eager**: `sweep` drains due candidates from the index and removes the
//!   entries they still describe.
//!
//! The two paths are independent and share only [`is_expired`](crate::entry::is_expired).

use rustc_hash::FxHashMap;

use ttlkv_core::{Error, Result, Timestamp};

use crate::entry::Entry;
use crate::expiry::ExpiryIndex;

/// Result of one cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Table entries removed
    pub removed: usize,
    /// Candidates discarded because the table no longer matched them
    pub stale: usize,
}

/// Point-in-time view of a store's size and eviction counters
///
/// Counters are cumulative since the store was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Entries physically present in the table, expired or not
    pub entries: usize,
    /// Candidates waiting in the expiry index, stale ones included
    pub pending_candidates: usize,
    /// Cleanup passes run (janitor and explicit purges)
    pub sweeps: u64,
    /// Entries removed by reads that found them expired
    pub lazy_evictions: u64,
    /// Entries removed by cleanup passes
    pub sweep_evictions: u64,
    /// Candidates discarded as stale by cleanup passes
    pub stale_candidates: u64,
}

/// The state guarded by the store lock
#[derive(Debug, Default)]
pub struct StoreState {
    table: FxHashMap<String, Entry>,
    index: ExpiryIndex,
    closed: bool,
    sweeps: u64,
    lazy_evictions: u64,
    sweep_evictions: u64,
    stale_candidates: u64,
}

impl StoreState {
    /// Create an empty, open state
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `StoreClosed` once `close()` has been called
    pub fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::StoreClosed)
        } else {
            Ok(())
        }
    }

    /// Mark the state closed
    ///
    /// Returns `true` if this call closed it.
    pub fn close(&mut self) -> bool {
        !std::mem::replace(&mut self.closed, true)
    }

    /// Check if the state has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Insert or overwrite `key`, and record one expiry candidate
    ///
    /// Last write wins: value and expiry are both replaced. Earlier
    /// candidates for the key stay in the index and are reconciled by
    /// `sweep`.
    pub fn put(&mut self, key: String, value: String, expiry: Timestamp) {
        self.index.push(expiry, key.clone());
        self.table.insert(key, Entry::new(value, expiry));
    }

    /// Read `key`, evicting it if it is expired at `now`
    pub fn get(&mut self, key: &str, now: Timestamp) -> Option<String> {
        let entry = self.table.get(key)?;
        if !entry.is_expired_at(now) {
            return Some(entry.value().to_owned());
        }
        self.evict_lazily(key);
        None
    }

    /// Check whether `key` is live at `now`, evicting it if it is expired
    pub fn contains_key(&mut self, key: &str, now: Timestamp) -> bool {
        match self.table.get(key).map(|entry| entry.is_expired_at(now)) {
            None => false,
            Some(false) => true,
            Some(true) => {
                self.evict_lazily(key);
                false
            }
        }
    }

    fn evict_lazily(&mut self, key: &str) {
        self.table.remove(key);
        self.lazy_evictions += 1;
    }

    /// Remove `key` from the table
    ///
    /// Returns `true` if an entry was present. The key's candidates are left
    /// in the index.
    pub fn delete(&mut self, key: &str) -> bool {
        self.table.remove(key).is_some()
    }

    /// Run one cleanup pass at `now`
    ///
    /// Pops every due candidate. A candidate removes its key only when the
    /// table still holds an entry whose expiry is no later than the
    /// candidate's; otherwise a later put superseded it and it is dropped.
    pub fn sweep(&mut self, now: Timestamp) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();

        while let Some(candidate) = self.index.pop_due(now) {
            let authoritative = self
                .table
                .get(&candidate.key)
                .is_some_and(|entry| entry.expiry() <= candidate.expiry);

            if authoritative {
                self.table.remove(&candidate.key);
                outcome.removed += 1;
            } else {
                outcome.stale += 1;
            }
        }

        self.sweeps += 1;
        self.sweep_evictions += outcome.removed as u64;
        self.stale_candidates += outcome.stale as u64;
        outcome
    }

    /// Number of entries physically present in the table
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of candidates in the expiry index
    pub fn pending_candidates(&self) -> usize {
        self.index.len()
    }

    /// Snapshot sizes and counters
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.table.len(),
            pending_candidates: self.index.len(),
            sweeps: self.sweeps,
            lazy_evictions: self.lazy_evictions,
            sweep_evictions: self.sweep_evictions,
            stale_candidates: self.stale_candidates,
        }
    }

    #[cfg(test)]
    fn expired_entries(&self, now: Timestamp) -> usize {
        self.table
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .count()
    }
}
