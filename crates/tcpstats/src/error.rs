//! Error types for tcpstats.

use std::path::PathBuf;

use tcpstats_core::{FilterTokenError, TcpStatsError};
use thiserror::Error;

/// Errors from loading or validating a [`crate::config::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `path` is empty.
    #[error("path cannot be empty")]
    EmptyPath,

    /// A port filter token is not an integer.
    #[error("invalid port filter: {0}")]
    InvalidPortFilter(#[from] FilterTokenError),

    /// A port filter entry is outside 0-65535.
    #[error("port filter must be between 0 and 65535 (got {0})")]
    PortOutOfRange(i64),

    /// `collection_interval` is zero.
    #[error("collection_interval must be greater than zero")]
    ZeroInterval,

    /// Config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML for this schema.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// A scrape produced no metrics.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The connection table could not be read.
    #[error(transparent)]
    Source(#[from] TcpStatsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(ConfigError::EmptyPath.to_string(), "path cannot be empty");
        assert!(ConfigError::PortOutOfRange(70000)
            .to_string()
            .contains("between 0 and 65535"));
        assert!(ConfigError::ZeroInterval
            .to_string()
            .contains("collection_interval"));
    }

    #[test]
    fn test_config_error_from_filter_token() {
        let err: ConfigError = tcpstats_core::parse_port_token("invalid").unwrap_err().into();
        assert!(matches!(err, ConfigError::InvalidPortFilter(_)));
        assert!(err.to_string().contains("'invalid'"));
    }

    #[test]
    fn test_config_error_from_yaml() {
        let yaml_err = serde_yaml_ng::from_str::<serde_yaml_ng::Value>("{{").unwrap_err();
        let err = ConfigError::from(yaml_err);
        assert!(err.to_string().starts_with("YAML error"));
    }

    #[test]
    fn test_scrape_error_is_transparent() {
        let source = TcpStatsError::Open {
            path: PathBuf::from("/proc/net/tcp"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
        };
        let expected = source.to_string();
        let err = ScrapeError::from(source);
        assert_eq!(err.to_string(), expected);
    }
}
