//! Error types for the postq-common crate.
//!
//! None of these are fatal to a delivery attempt. An invalid address only
//! leaves a hostname tag unset, and configuration errors surface once at
//! startup before any worker runs.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors produced while extracting the domain from an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The address did not match `local-part@domain.tld` exactly once.
    #[error("Invalid email address: {0:?}")]
    InvalidAddress(String),
}

/// A persisted binding index that does not name a tier of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown delayed binding index: {0}")]
pub struct UnknownBinding(pub u8);

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Unable to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    #[test]
    fn test_address_error_display() {
        let err = AddressError::InvalidAddress("nobody".to_string());
        assert_eq!(err.to_string(), "Invalid email address: \"nobody\"");
    }

    #[test]
    fn test_config_error_source_chain() {
        let err = ConfigError::Read {
            path: PathBuf::from("/etc/postq.ron"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };

        assert!(err.source().is_some());
        assert_eq!(
            err.to_string(),
            "Unable to read configuration file /etc/postq.ron: no such file"
        );
    }
}
