//! Storage layer for ttlkv
//!
//! This crate implements the TTL key-value store with:
//! - Store: the public handle (put/get/delete/stop)
//! - StoreState: table + expiry index guarded by a single lock
//! - ExpiryIndex: min-heap of expiry candidates
//! - StoreConfig: cleanup interval, builder or TOML

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod entry;
pub mod expiry;
mod janitor;
pub mod state;
pub mod store;

pub use config::{StoreConfig, DEFAULT_CLEANUP_INTERVAL_MS};
pub use entry::Entry;
pub use expiry::{Candidate, ExpiryIndex};
pub use state::{StoreState, StoreStats, SweepOutcome};
pub use store::Store;
