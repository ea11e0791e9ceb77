//! YAML configuration for the TCP stats receiver.
//!
//! ```yaml
//! path: /proc/net/tcp
//! portfilter: "80,443"
//! collection_interval: 10s
//! initial_delay: 1s
//! metrics:
//!   tcp.queue.size:
//!     enabled: true
//!   tcp.queue.length:
//!     enabled: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tcpstats_core::{parse_port_token, DEFAULT_PATH};

use crate::error::ConfigError;
use crate::metrics::MetricsBuilderConfig;

/// Default time between scrapes.
pub const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_secs(60);
/// Default wait before the first scrape.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Receiver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Connection table to read (default: /proc/net/tcp)
    pub path: PathBuf,
    /// Comma-separated list of local ports to report (default: all)
    pub portfilter: String,
    /// Time between scrapes
    #[serde(with = "duration")]
    pub collection_interval: Duration,
    /// Wait before the first scrape
    #[serde(with = "duration")]
    pub initial_delay: Duration,
    /// Per-metric enablement
    pub metrics: MetricsBuilderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            portfilter: String::new(),
            collection_interval: DEFAULT_COLLECTION_INTERVAL,
            initial_delay: DEFAULT_INITIAL_DELAY,
            metrics: MetricsBuilderConfig::default(),
        }
    }
}

impl Config {
    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // A document with no content is a null, not an empty map.
        let blank = contents.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if blank {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(contents)?)
    }

    /// Read, parse and validate a config file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the parser itself does not constrain.
    ///
    /// Unlike the scrape-time filter, which skips bad tokens, a port filter
    /// that does not fully parse is rejected here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }

        if !self.portfilter.is_empty() {
            for token in self.portfilter.split(',') {
                let port = parse_port_token(token)?;
                if !(0..=i64::from(u16::MAX)).contains(&port) {
                    return Err(ConfigError::PortOutOfRange(port));
                }
            }
        }

        if self.collection_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(())
    }

    /// Default configuration as a commented YAML document.
    pub fn default_yaml() -> String {
        format!(
            r#"# tcpstats configuration
#
# Connection table to read.
path: {path}

# Comma-separated local ports to report; empty reports every port.
portfilter: ""

# Time between scrapes and before the first one (e.g. 500ms, 10s, 1m).
collection_interval: {interval}
initial_delay: {delay}

metrics:
  tcp.queue.size:
    enabled: true
  tcp.queue.length:
    enabled: true
"#,
            path = DEFAULT_PATH,
            interval = duration::format(DEFAULT_COLLECTION_INTERVAL),
            delay = duration::format(DEFAULT_INITIAL_DELAY),
        )
    }
}

/// Parse a duration such as `500ms`, `10s`, `1m30s` or `1.5h`.
///
/// A bare `0` is accepted; any other number needs a unit
/// (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`).
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    duration::parse(text)
}

mod duration {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    const UNITS: [(&str, u64); 7] = [
        ("h", 3_600_000_000_000),
        ("m", 60_000_000_000),
        ("s", 1_000_000_000),
        ("ms", 1_000_000),
        ("us", 1_000),
        ("µs", 1_000),
        ("ns", 1),
    ];

    pub(super) fn parse(text: &str) -> Result<Duration, String> {
        let s = text.trim();
        if s.is_empty() {
            return Err("empty duration".to_string());
        }
        if s == "0" {
            return Ok(Duration::ZERO);
        }

        let mut total = Duration::ZERO;
        let mut rest = s;
        while !rest.is_empty() {
            let number_len = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .ok_or_else(|| format!("missing unit in duration '{text}'"))?;
            if number_len == 0 {
                return Err(format!("invalid duration '{text}'"));
            }
            let value: f64 = rest[..number_len]
                .parse()
                .map_err(|_| format!("invalid duration '{text}'"))?;

            let tail = &rest[number_len..];
            let unit_len = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let unit = &tail[..unit_len];
            let nanos_per_unit = UNITS
                .iter()
                .find(|(name, _)| *name == unit)
                .map(|(_, nanos)| *nanos)
                .ok_or_else(|| format!("unknown unit '{unit}' in duration '{text}'"))?;

            #[allow(clippy::cast_precision_loss)]
            let nanos = (value * nanos_per_unit as f64).round() as u64;
            total += Duration::from_nanos(nanos);
            rest = &tail[unit_len..];
        }
        Ok(total)
    }

    /// Largest unit that represents `d` exactly.
    pub(super) fn format(d: Duration) -> String {
        let nanos = d.as_nanos();
        if nanos == 0 {
            return "0s".to_string();
        }
        UNITS
            .iter()
            .filter(|(name, _)| *name != "µs")
            .find(|(_, size)| nanos % u128::from(*size) == 0)
            .map_or_else(
                || format!("{nanos}ns"),
                |(name, size)| format!("{}{name}", nanos / u128::from(*size)),
            )
    }

    pub(super) fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*d))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(de::Error::custom)
    }
}
