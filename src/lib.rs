//! ttlkv - concurrent in-memory key-value store with per-entry TTL
//!
//! Values expire a fixed duration after they are written. Reads never see
//! an expired value, and a background janitor thread reclaims expired
//! entries that are never read again.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use ttlkv::{Store, StoreConfig};
//!
//! let config = StoreConfig::new().with_cleanup_interval(Duration::from_millis(500));
//! let store = Store::with_config(config)?;
//!
//! store.put("user:123", "Alice", Duration::from_secs(2))?;
//! assert_eq!(store.get("user:123")?, Some("Alice".to_string()));
//!
//! // Stop the janitor; later operations fail with `Error::StoreClosed`
//! store.stop();
//! # Ok::<(), ttlkv::Error>(())
//! ```
//!
//! # Architecture
//!
//! - [`ttlkv_core`]: timestamps, clocks and errors
//! - [`ttlkv_storage`]: the store, its expiry index and janitor

pub use ttlkv_core::{Clock, Error, ManualClock, MonotonicClock, Result, Timestamp};
pub use ttlkv_storage::{Store, StoreConfig, StoreStats, DEFAULT_CLEANUP_INTERVAL_MS};
