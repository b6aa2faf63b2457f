//! Configuration consumed by the delivery core.
//!
//! The configuration is written in RON. Every field is optional; missing
//! values take their defaults once [`Config::init`] has run, which both
//! loaders do for you.
//!
//! ```ron
//! (
//!     timeout: (
//!         connection_secs: 60,
//!         data_secs: 300,
//!     ),
//!     max_try_connection_count: 10,
//! )
//! ```

pub mod timeouts;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use timeouts::Timeout;

use crate::error::ConfigError;

/// The maximum number of times a worker tries to connect to a remote
/// exchanger while sending a single message.
pub const MAX_TRY_CONNECTION_COUNT: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeout: Timeout,

    #[serde(default = "default_max_try_connection_count")]
    pub max_try_connection_count: u32,
}

const fn default_max_try_connection_count() -> u32 {
    MAX_TRY_CONNECTION_COUNT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Timeout::initialized(),
            max_try_connection_count: MAX_TRY_CONNECTION_COUNT,
        }
    }
}

impl Config {
    /// Parse a configuration from a RON string and apply defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the input is not valid RON for this
    /// structure.
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = ron::from_str(content)?;
        config.init();
        Ok(config)
    }

    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Self::from_ron_str(&content)
    }

    pub const fn init(&mut self) {
        self.timeout.init();
        if self.max_try_connection_count == 0 {
            self.max_try_connection_count = MAX_TRY_CONNECTION_COUNT;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty_config_takes_defaults() {
        let config = Config::from_ron_str("()").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.timeout.is_initialized());
    }

    #[test]
    fn test_partial_timeouts() {
        let config = Config::from_ron_str(
            "(timeout: (connection_secs: 60, data_secs: 900), max_try_connection_count: 5)",
        )
        .unwrap();

        assert_eq!(config.timeout.connection_secs, 60);
        assert_eq!(config.timeout.data_secs, 900);
        assert_eq!(config.timeout.mail_secs, 300);
        assert_eq!(config.max_try_connection_count, 5);
    }

    #[test]
    fn test_zero_means_default() {
        let config =
            Config::from_ron_str("(timeout: (sleep_secs: 0), max_try_connection_count: 0)")
                .unwrap();

        assert_eq!(config.timeout.sleep_secs, 1);
        assert_eq!(config.max_try_connection_count, MAX_TRY_CONNECTION_COUNT);
    }

    #[test]
    fn test_invalid_config() {
        let result = Config::from_ron_str("(timeout: (connection_secs: \"soon\"))");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load("/nonexistent/postq/config.ron");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
