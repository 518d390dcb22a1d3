//! Core types for ttlkv
//!
//! This crate defines the foundational types shared by the store:
//! - Timestamp: Microsecond-precision point on a clock's timeline
//! - Clock: Time source trait with monotonic and manual implementations
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod error;
pub mod timestamp;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{Error, Result};
pub use timestamp::Timestamp;
