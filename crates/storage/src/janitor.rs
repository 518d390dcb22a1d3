//! Background cleanup thread
//!
//! The `Janitor` owns one thread that sleeps for the configured interval,
//! then runs a cleanup pass, until it is stopped.
//!
//! # Thread Lifecycle
//!
//! - The thread starts when the janitor is spawned (state: Running)
//! - `stop()` sets the stop flag under the signal mutex, wakes the thread
//!   and joins it (state: Stopped, terminal)
//! - The stop flag is checked under the same mutex before every wait, so a
//!   stop request is never lost and never waits out a full interval
//! - Cleanup passes take the store lock; the sleep happens without it

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use ttlkv_core::Result;

use crate::store::Shared;

/// Name given to the janitor thread
pub(crate) const JANITOR_THREAD_NAME: &str = "ttlkv-janitor";

/// Handle to a store's background cleanup thread
pub(crate) struct Janitor {
    /// Stop flag plus the condvar the thread sleeps on
    signal: Arc<(Mutex<bool>, Condvar)>,
    /// Thread handle; `None` once joined
    thread: Mutex<Option<JoinHandle<()>>>,
    interval: Duration,
}

impl Janitor {
    /// Start the cleanup thread for `shared`
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the OS refuses to create the thread.
    pub(crate) fn spawn(shared: Arc<Shared>, interval: Duration) -> Result<Self> {
        let signal = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name(JANITOR_THREAD_NAME.to_string())
            .spawn(move || run(&shared, &thread_signal, interval))?;

        Ok(Self {
            signal,
            thread: Mutex::new(Some(handle)),
            interval,
        })
    }

    /// Stop the thread and wait for it to exit
    ///
    /// Returns `true` if this call joined the thread. Later calls return
    /// `false` immediately; a call racing with the one doing the join
    /// blocks until the join completes.
    pub(crate) fn stop(&self) -> bool {
        {
            let (lock, cvar) = &*self.signal;
            let mut stop = lock.lock();
            *stop = true;
            cvar.notify_all();
        }

        let mut thread_guard = self.thread.lock();
        match thread_guard.take() {
            Some(handle) => {
                // A panicked janitor has already stopped sweeping
                let _ = handle.join();
                true
            }
            None => false,
        }
    }

    /// Check if the thread has not been stopped yet
    pub(crate) fn is_running(&self) -> bool {
        self.thread.lock().is_some()
    }
}

impl std::fmt::Debug for Janitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Janitor")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

fn run(shared: &Shared, signal: &(Mutex<bool>, Condvar), interval: Duration) {
    info!(
        target: "ttlkv::janitor",
        interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        "Janitor started"
    );

    // Sleep first (nothing to clean on start)
    while !wait_for_stop(signal, interval) {
        let outcome = shared.sweep();
        if outcome.removed > 0 || outcome.stale > 0 {
            debug!(
                target: "ttlkv::janitor",
                removed = outcome.removed,
                stale = outcome.stale,
                "Cleanup pass"
            );
        }
    }

    info!(target: "ttlkv::janitor", "Janitor stopped");
}

/// Sleep for `interval` or until stopped; returns `true` if stopped
fn wait_for_stop(signal: &(Mutex<bool>, Condvar), interval: Duration) -> bool {
    let (lock, cvar) = signal;
    // An interval too large for `Instant` means waiting for stop only
    let deadline = Instant::now().checked_add(interval);
    let mut stop = lock.lock();
    while !*stop {
        // Spurious wake-ups loop back and wait for the remainder
        match deadline {
            Some(deadline) => {
                if cvar.wait_until(&mut stop, deadline).timed_out() {
                    break;
                }
            }
            None => cvar.wait(&mut stop),
        }
    }
    *stop
}
