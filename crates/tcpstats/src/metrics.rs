//! Metric data model for TCP queue statistics.
//!
//! Two metrics are produced per scrape:
//!
//! | name               | unit            | attributes                                   |
//! |--------------------|-----------------|----------------------------------------------|
//! | `tcp.queue.size`   | `By`            | `local_address`, `local_port`, `direction`   |
//! | `tcp.queue.length` | `{connections}` | `local_address`, `local_port`                |

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Name of the queued-bytes metric.
pub const TCP_QUEUE_SIZE: &str = "tcp.queue.size";
/// Name of the connection-count metric.
pub const TCP_QUEUE_LENGTH: &str = "tcp.queue.length";

/// Wall-clock time of a data point, in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_unix_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    pub const fn as_unix_nanos(self) -> u64 {
        self.0
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        // Clocks before 1970 clamp to zero.
        let nanos = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// Queue direction for `tcp.queue.size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Bytes sent but not yet acknowledged
    Tx,
    /// Bytes received but not yet read by the application
    Rx,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tx => "tx",
            Self::Rx => "rx",
        }
    }
}

/// Value of a data point attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<u32> for AttributeValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

/// One recorded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataPoint {
    pub timestamp: Timestamp,
    pub value: u64,
    pub attributes: BTreeMap<&'static str, AttributeValue>,
}

impl DataPoint {
    /// Look up an attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

/// A named gauge with its data points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
    pub data_points: Vec<DataPoint>,
}

/// Batch of metrics emitted by one scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub metrics: Vec<Metric>,
}

impl Metrics {
    /// Number of metrics in the batch.
    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }

    /// Number of data points across all metrics.
    pub fn data_point_count(&self) -> usize {
        self.metrics.iter().map(|m| m.data_points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Find a metric by name.
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

/// Per-metric switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricConfig {
    pub enabled: bool,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Which metrics the builder records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsBuilderConfig {
    #[serde(rename = "tcp.queue.size")]
    pub tcp_queue_size: MetricConfig,
    #[serde(rename = "tcp.queue.length")]
    pub tcp_queue_length: MetricConfig,
}

/// Accumulates data points until [`emit`](Self::emit) is called.
#[derive(Debug, Clone)]
pub struct MetricsBuilder {
    config: MetricsBuilderConfig,
    queue_size: Vec<DataPoint>,
    queue_length: Vec<DataPoint>,
}

impl Default for MetricsBuilder {
    fn default() -> Self {
        Self::new(MetricsBuilderConfig::default())
    }
}

impl MetricsBuilder {
    pub fn new(config: MetricsBuilderConfig) -> Self {
        Self {
            config,
            queue_size: Vec::new(),
            queue_length: Vec::new(),
        }
    }

    pub fn config(&self) -> &MetricsBuilderConfig {
        &self.config
    }

    /// Record queued bytes for one socket and direction.
    pub fn record_tcp_queue_size_data_point(
        &mut self,
        timestamp: Timestamp,
        value: u64,
        local_address: &str,
        local_port: u32,
        direction: Direction,
    ) {
        if !self.config.tcp_queue_size.enabled {
            return;
        }
        let mut attributes = socket_attributes(local_address, local_port);
        attributes.insert("direction", direction.as_str().into());
        self.queue_size.push(DataPoint {
            timestamp,
            value,
            attributes,
        });
    }

    /// Record the connection count for one socket.
    pub fn record_tcp_queue_length_data_point(
        &mut self,
        timestamp: Timestamp,
        value: u64,
        local_address: &str,
        local_port: u32,
    ) {
        if !self.config.tcp_queue_length.enabled {
            return;
        }
        self.queue_length.push(DataPoint {
            timestamp,
            value,
            attributes: socket_attributes(local_address, local_port),
        });
    }

    /// Take everything recorded so far. Metrics without data points are
    /// left out, and the builder starts empty again.
    pub fn emit(&mut self) -> Metrics {
        let mut metrics = Vec::with_capacity(2);
        if !self.queue_size.is_empty() {
            metrics.push(Metric {
                name: TCP_QUEUE_SIZE,
                description: "Bytes waiting in TCP send and receive queues.",
                unit: "By",
                data_points: std::mem::take(&mut self.queue_size),
            });
        }
        if !self.queue_length.is_empty() {
            metrics.push(Metric {
                name: TCP_QUEUE_LENGTH,
                description: "Number of active TCP connections on the socket.",
                unit: "{connections}",
                data_points: std::mem::take(&mut self.queue_length),
            });
        }
        Metrics { metrics }
    }
}

fn socket_attributes(local_address: &str, local_port: u32) -> BTreeMap<&'static str, AttributeValue> {
    let mut attributes = BTreeMap::new();
    attributes.insert("local_address", local_address.into());
    attributes.insert("local_port", local_port.into());
    attributes
}
