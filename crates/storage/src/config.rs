//! Store configuration
//!
//! The store has a single tunable: how long the janitor sleeps between
//! cleanup passes. It can be set in code with the builder methods, or
//! loaded from TOML:
//!
//! ```toml
//! # Milliseconds between janitor passes (default: 1000)
//! cleanup_interval_ms = 1000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ttlkv_core::{Error, Result};

/// Default interval between janitor passes, in milliseconds
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 1_000;

fn default_cleanup_interval_ms() -> u64 {
    DEFAULT_CLEANUP_INTERVAL_MS
}

/// Configuration for a [`Store`](crate::Store)
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ttlkv_storage::StoreConfig;
///
/// let config = StoreConfig::new().with_cleanup_interval(Duration::from_millis(250));
/// assert_eq!(config.cleanup_interval(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Milliseconds between janitor passes. Must be positive.
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_ms: default_cleanup_interval_ms(),
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the interval between janitor passes
    ///
    /// The interval is kept at millisecond resolution. Anything shorter
    /// than one millisecond, zero included, becomes one millisecond.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        let millis = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self.cleanup_interval_ms = millis.max(1);
        self
    }

    /// Interval between janitor passes
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Check the configuration for values the store cannot run with
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `cleanup_interval_ms` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.cleanup_interval_ms == 0 {
            return Err(Error::invalid_config(
                "cleanup_interval_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# ttlkv store configuration
#
# Milliseconds between background cleanup passes (default: 1000).
# Expired entries are never returned by reads regardless of this value;
# it only bounds how long unread expired entries occupy memory.
cleanup_interval_ms = 1000
"#
    }

    /// Parse and validate a configuration from TOML text.
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the text is not valid TOML, contains
    /// unknown keys, or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read, or `InvalidConfig` as
    /// described for [`from_toml_str`](StoreConfig::from_toml_str).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::InvalidConfig(msg) => {
                Error::invalid_config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }
}
