//! Error types for ttlkv
//!
//! Missing and expired keys are not errors: lookups report them as `None`.
//! The variants below cover misuse of a stopped store and configuration
//! problems. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.

use std::io;
use thiserror::Error;

/// Result type alias for ttlkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ttlkv
#[derive(Debug, Error)]
pub enum Error {
    /// Operation invoked after the store was stopped
    #[error("Store is closed")]
    StoreClosed,

    /// Configuration could not be parsed or failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (config file read, janitor thread spawn)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// Create an invalid-configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Returns true if this error means the store has been stopped
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::StoreClosed)
    }
}
