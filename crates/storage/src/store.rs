//! Store: concurrent key-value map with per-entry TTL
//!
//! This module ties the pieces together:
//! - `StoreState` (table + expiry index + counters) behind one
//!   `parking_lot::Mutex`
//! - a `Clock` for "now"
//! - a `Janitor` thread that runs cleanup passes
//!
//! # Design Notes
//!
//! - **One lock**: table and index are always updated together; every
//!   operation and every cleanup pass holds the lock for its whole critical
//!   section and never across a sleep
//! - **Expiry read under the lock**: "now" is sampled after the lock is
//!   acquired, so same-key operations see non-decreasing times in lock order
//! - **No global state**: each store owns its lock, clock and janitor
//! - **Stopped stores reject operations**: after `stop()` every operation
//!   returns `Error::StoreClosed`; introspection (`len`, `stats`) still works

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, trace};

use ttlkv_core::{Clock, MonotonicClock, Result};

use crate::config::StoreConfig;
use crate::janitor::Janitor;
use crate::state::{StoreState, StoreStats, SweepOutcome};

/// State shared between the store handle and its janitor thread
pub(crate) struct Shared {
    pub(crate) state: Mutex<StoreState>,
    clock: Arc<dyn Clock>,
}

impl Shared {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState::new()),
            clock,
        }
    }

    /// Run one cleanup pass under the lock
    pub(crate) fn sweep(&self) -> SweepOutcome {
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.sweep(now)
    }
}

/// Concurrent in-memory key-value store with TTL expiration
///
/// Reads never return an expired value: `get` checks the entry's expiry
/// and evicts it on the spot. A background janitor thread reclaims expired
/// entries nobody reads again.
///
/// `Store` is `Send + Sync`; share it between threads with `Arc`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ttlkv_storage::Store;
///
/// let store = Store::new()?;
/// store.put("session", "abc123", Duration::from_secs(30))?;
/// assert_eq!(store.get("session")?, Some("abc123".to_string()));
///
/// store.delete("session")?;
/// assert_eq!(store.get("session")?, None);
///
/// store.stop();
/// # Ok::<(), ttlkv_core::Error>(())
/// ```
pub struct Store {
    shared: Arc<Shared>,
    janitor: Janitor,
    config: StoreConfig,
}

impl Store {
    /// Create a store with the default configuration (1 second cleanup interval)
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the janitor thread cannot be spawned.
    pub fn new() -> Result<Self> {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store with the given configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation, or
    /// `IoError` if the janitor thread cannot be spawned.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Create a store that reads time from `clock`
    ///
    /// The janitor still sleeps in real time; only expiry decisions use
    /// `clock`.
    ///
    /// # Errors
    ///
    /// Same as [`with_config`](Store::with_config).
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared::new(clock));
        let janitor = Janitor::spawn(Arc::clone(&shared), config.cleanup_interval())?;

        Ok(Self {
            shared,
            janitor,
            config,
        })
    }

    /// Store `value` under `key` for `ttl`
    ///
    /// Overwrites any previous entry, value and expiry both. A zero `ttl`
    /// is accepted; the entry is already expired on the next read.
    ///
    /// # Errors
    ///
    /// Returns `StoreClosed` after `stop()`.
    pub fn put(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Duration,
    ) -> Result<()> {
        let key = key.into();
        let value = value.into();

        let mut state = self.shared.state.lock();
        state.ensure_open()?;
        let expiry = self.shared.clock.now().saturating_add(ttl);
        state.put(key, value, expiry);
        Ok(())
    }

    /// Get the value for `key`
    ///
    /// Returns `None` if the key is absent or expired. An expired entry is
    /// removed as a side effect.
    ///
    /// # Errors
    ///
    /// Returns `StoreClosed` after `stop()`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut state = self.shared.state.lock();
        state.ensure_open()?;
        let now = self.shared.clock.now();
        let value = state.get(key, now);
        if value.is_none() {
            trace!(target: "ttlkv::store", key, "Miss");
        }
        Ok(value)
    }

    /// Check whether `key` holds a live value
    ///
    /// Like `get`, removes the entry if it is expired.
    ///
    /// # Errors
    ///
    /// Returns `StoreClosed` after `stop()`.
    pub fn contains_key(&self, key: &str) -> Result<bool> {
        let mut state = self.shared.state.lock();
        state.ensure_open()?;
        let now = self.shared.clock.now();
        Ok(state.contains_key(key, now))
    }

    /// Remove `key`; a no-op if it is absent
    ///
    /// # Errors
    ///
    /// Returns `StoreClosed` after `stop()`.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.shared.state.lock();
        state.ensure_open()?;
        state.delete(key);
        Ok(())
    }

    /// Run one cleanup pass on the calling thread
    ///
    /// Returns the number of expired entries removed. The janitor does the
    /// same work periodically; this is for callers that want memory back
    /// now.
    ///
    /// # Errors
    ///
    /// Returns `StoreClosed` after `stop()`.
    pub fn purge_expired(&self) -> Result<usize> {
        let mut state = self.shared.state.lock();
        state.ensure_open()?;
        let now = self.shared.clock.now();
        Ok(state.sweep(now).removed)
    }

    /// Stop the janitor and close the store
    ///
    /// Blocks until the janitor thread has exited; no cleanup pass runs
    /// after this returns. Subsequent operations fail with `StoreClosed`.
    /// Calling `stop()` again is a no-op.
    pub fn stop(&self) {
        let joined = self.janitor.stop();
        let closed = self.shared.state.lock().close();
        if joined || closed {
            info!(target: "ttlkv::store", "Store stopped");
        }
    }

    /// Check if `stop()` has been called
    pub fn is_stopped(&self) -> bool {
        self.shared.state.lock().is_closed()
    }

    /// Number of entries physically present, including expired entries not
    /// yet reclaimed
    pub fn len(&self) -> usize {
        self.shared.state.lock().len()
    }

    /// Check if no entries are physically present
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().is_empty()
    }

    /// Number of candidates in the expiry index, stale ones included
    pub fn pending_candidates(&self) -> usize {
        self.shared.state.lock().pending_candidates()
    }

    /// Snapshot of sizes and eviction counters
    pub fn stats(&self) -> StoreStats {
        self.shared.state.lock().stats()
    }

    /// The configuration this store was created with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The janitor's Debug takes its thread lock, which `stop()` holds
        // while joining a janitor that may be waiting on the state lock.
        let (entries, pending_candidates, closed) = {
            let state = self.shared.state.lock();
            (state.len(), state.pending_candidates(), state.is_closed())
        };
        f.debug_struct("Store")
            .field("entries", &entries)
            .field("pending_candidates", &pending_candidates)
            .field("closed", &closed)
            .field("janitor", &self.janitor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttlkv_core::{Error, ManualClock, Timestamp};

    /// Store on a manual clock with a janitor that effectively never runs
    fn manual_store() -> (Store, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Timestamp::from_secs(1)));
        let config = StoreConfig::new().with_cleanup_interval(Duration::from_secs(3600));
        let store = Store::with_clock(config, clock.clone()).unwrap();
        (store, clock)
    }

    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Store>();
    }

    #[test]
    fn test_put_get_delete() {
        let (store, _clock) = manual_store();

        store.put("k", "v", Duration::from_secs(10)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));

        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_get_after_ttl_is_absent() {
        let (store, clock) = manual_store();
        store.put("k", "v", Duration::from_millis(100)).unwrap();

        clock.advance(Duration::from_millis(99));
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));

        clock.advance(Duration::from_millis(1));
        assert_eq!(store.get("k").unwrap(), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_zero_ttl_is_immediately_absent() {
        let (store, _clock) = manual_store();
        store.put("k", "v", Duration::ZERO).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k").unwrap(), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_overwrite_uses_latest_ttl() {
        let (store, clock) = manual_store();
        store.put("k", "v1", Duration::from_secs(10)).unwrap();
        store.put("k", "v2", Duration::from_millis(10)).unwrap();

        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));
        clock.advance(Duration::from_millis(10));
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_contains_key() {
        let (store, clock) = manual_store();
        store.put("k", "v", Duration::from_millis(5)).unwrap();

        assert!(store.contains_key("k").unwrap());
        clock.advance(Duration::from_millis(5));
        assert!(!store.contains_key("k").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let (store, clock) = manual_store();
        store.put("short", "1", Duration::from_millis(10)).unwrap();
        store.put("long", "2", Duration::from_secs(10)).unwrap();

        clock.advance(Duration::from_millis(20));
        assert_eq!(store.purge_expired().unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.pending_candidates(), 1);
        assert_eq!(store.get("long").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_operations_after_stop_are_rejected() {
        let (store, _clock) = manual_store();
        store.put("k", "v", Duration::from_secs(10)).unwrap();
        store.stop();

        assert!(store.is_stopped());
        assert!(matches!(
            store.put("k", "v", Duration::from_secs(1)),
            Err(Error::StoreClosed)
        ));
        assert!(matches!(store.get("k"), Err(Error::StoreClosed)));
        assert!(matches!(store.delete("k"), Err(Error::StoreClosed)));
        assert!(matches!(store.contains_key("k"), Err(Error::StoreClosed)));
        assert!(matches!(store.purge_expired(), Err(Error::StoreClosed)));

        // Introspection still works
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().entries, 1);
    }

    #[test]
    fn test_stop_twice_is_noop() {
        let (store, _clock) = manual_store();
        store.stop();
        store.stop();
        assert!(store.is_stopped());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StoreConfig {
            cleanup_interval_ms: 0,
        };
        assert!(matches!(
            Store::with_config(config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_accessor() {
        let config = StoreConfig::new().with_cleanup_interval(Duration::from_millis(75));
        let store = Store::with_config(config.clone()).unwrap();
        assert_eq!(store.config(), &config);
    }

    #[test]
    fn test_debug_output() {
        let (store, _clock) = manual_store();
        store.put("k", "v", Duration::from_secs(1)).unwrap();
        let debug = format!("{:?}", store);
        assert!(debug.contains("entries: 1"));
        assert!(debug.contains("closed: false"));
    }

    /// `fmt::Write` sink that stalls on its first write
    struct SlowWriter {
        stalled: bool,
        out: String,
    }

    impl std::fmt::Write for SlowWriter {
        fn write_str(&mut self, s: &str) -> std::fmt::Result {
            if !self.stalled {
                self.stalled = true;
                std::thread::sleep(Duration::from_millis(200));
            }
            self.out.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_debug_does_not_block_concurrent_stop() {
        use std::fmt::Write as _;
        use std::sync::mpsc;
        use std::thread;

        let config = StoreConfig::new().with_cleanup_interval(Duration::from_millis(1));
        let store = Arc::new(Store::with_config(config).unwrap());
        let (done_tx, done_rx) = mpsc::channel();

        let formatter = {
            let store = Arc::clone(&store);
            let done_tx = done_tx.clone();
            thread::spawn(move || {
                let mut writer = SlowWriter {
                    stalled: false,
                    out: String::new(),
                };
                write!(writer, "{:?}", store).unwrap();
                done_tx.send("debug").unwrap();
                writer.out
            })
        };

        // Let the formatter reach its stalled write first
        thread::sleep(Duration::from_millis(50));
        let stopper = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store.stop();
                done_tx.send("stop").unwrap();
            })
        };

        let mut finished = Vec::new();
        for _ in 0..2 {
            finished.push(
                done_rx
                    .recv_timeout(Duration::from_secs(5))
                    .expect("Debug and stop() deadlocked"),
            );
        }
        finished.sort_unstable();
        assert_eq!(finished, vec!["debug", "stop"]);

        let out = formatter.join().unwrap();
        stopper.join().unwrap();
        assert!(out.starts_with("Store"));
        assert!(out.contains("janitor"));
        assert!(store.is_stopped());
    }

    #[test]
    fn test_independent_stores() {
        let (a, _clock_a) = manual_store();
        let (b, _clock_b) = manual_store();

        a.put("k", "from-a", Duration::from_secs(1)).unwrap();
        assert_eq!(b.get("k").unwrap(), None);

        a.stop();
        b.put("k", "from-b", Duration::from_secs(1)).unwrap();
        assert_eq!(b.get("k").unwrap(), Some("from-b".to_string()));
    }
}
