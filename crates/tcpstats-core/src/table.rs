//! Connection table parser and per-socket aggregation.
//!
//! Columns used from each `/proc/net/tcp` row:
//!
//! - 1: `local_address:port`
//! - 3: `st` (state, hex)
//! - 4: `tx_queue:rx_queue` (hex)
//!
//! For every local `address:port` the tx and rx queues of all counted rows
//! are summed and the counted connections tallied.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::address::decode_address_port;
use crate::error::{LineFormatError, TcpStatsError};
use crate::port_filter::PortFilter;
use crate::state::{classify, Inclusion};
use crate::warning::{TracingSink, Warning, WarningSink};

/// Default location of the IPv4 TCP table.
pub const DEFAULT_PATH: &str = "/proc/net/tcp";

/// Rows with fewer whitespace-separated fields are ignored.
pub const MIN_FIELDS: usize = 9;

/// Local endpoint an aggregate belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregateKey {
    pub local_address: String,
    pub local_port: u32,
}

/// Running totals. Sums saturate at `u64::MAX` and never decrease.
#[derive(Debug, Clone, Copy, Default)]
struct AggregateEntry {
    tx_queue: u64,
    rx_queue: u64,
    queue_length: u64,
}

impl AggregateEntry {
    fn add(&mut self, tx_queue: u64, rx_queue: u64, queue_length: u64) {
        self.tx_queue = self.tx_queue.saturating_add(tx_queue);
        self.rx_queue = self.rx_queue.saturating_add(rx_queue);
        self.queue_length = self.queue_length.saturating_add(queue_length);
    }
}

/// Totals for one local endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpStatsResult {
    /// Dotted-quad local address
    pub local_address: String,
    /// Local port
    pub local_port: u32,
    /// Sum of `tx_queue` bytes
    pub tx_queue: u64,
    /// Sum of `rx_queue` bytes
    pub rx_queue: u64,
    /// Number of counted connections (listening sockets count as zero)
    pub queue_length: u64,
}

/// A row that survived decoding, filtering and classification.
struct CountedRow {
    key: AggregateKey,
    tx_queue: u64,
    rx_queue: u64,
    queue_length: u64,
}

/// Reader of one connection table.
///
/// The port filter is parsed once here and reused by every [`get`](Self::get)
/// call; nothing else is kept between passes.
#[derive(Debug)]
pub struct TcpStats<W = TracingSink> {
    path: PathBuf,
    port_filter: PortFilter,
    sink: W,
}

impl<W: WarningSink> TcpStats<W> {
    /// Create a reader for `path`, restricted to the comma-separated
    /// `port_filter` list (empty for all ports).
    pub fn new(path: impl Into<PathBuf>, port_filter: &str, sink: W) -> Self {
        let port_filter = PortFilter::parse(port_filter, &sink);
        Self::with_filter(path, port_filter, sink)
    }

    /// Create a reader with an already built filter.
    pub fn with_filter(path: impl Into<PathBuf>, port_filter: PortFilter, sink: W) -> Self {
        Self {
            path: path.into(),
            port_filter,
            sink,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn port_filter(&self) -> &PortFilter {
        &self.port_filter
    }

    /// Read the table at the configured path and aggregate it.
    ///
    /// The file is open only for the duration of this call. An open or read
    /// failure discards everything aggregated so far.
    pub fn get(&self) -> Result<Vec<TcpStatsResult>, TcpStatsError> {
        let file = File::open(&self.path).map_err(|source| TcpStatsError::Open {
            path: self.path.clone(),
            source,
        })?;

        self.read_from(BufReader::new(file))
            .map_err(|source| TcpStatsError::Read {
                path: self.path.clone(),
                source,
            })
    }

    /// Aggregate a table from any buffered reader.
    ///
    /// The first line is always treated as the header. Results are sorted by
    /// address, then port.
    pub fn read_from<R: BufRead>(&self, reader: R) -> io::Result<Vec<TcpStatsResult>> {
        let mut aggregates: HashMap<AggregateKey, AggregateEntry> = HashMap::new();

        for (index, line) in reader.split(b'\n').enumerate() {
            let line = line?;
            if index == 0 {
                continue; // header
            }

            let line = String::from_utf8_lossy(&line);
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < MIN_FIELDS {
                continue;
            }

            match self.parse_row(&fields) {
                Ok(Some(row)) => aggregates.entry(row.key).or_default().add(
                    row.tx_queue,
                    row.rx_queue,
                    row.queue_length,
                ),
                Ok(None) => {}
                Err(error) => self.sink.warn(&Warning::Line {
                    line: index + 1,
                    error,
                }),
            }
        }

        let mut results: Vec<TcpStatsResult> = aggregates
            .into_iter()
            .map(|(key, entry)| TcpStatsResult {
                local_address: key.local_address,
                local_port: key.local_port,
                tx_queue: entry.tx_queue,
                rx_queue: entry.rx_queue,
                queue_length: entry.queue_length,
            })
            .collect();
        results.sort_by(|a, b| {
            (&a.local_address, a.local_port).cmp(&(&b.local_address, b.local_port))
        });
        Ok(results)
    }

    /// Decode one data row. `Ok(None)` means the row is filtered out.
    fn parse_row(&self, fields: &[&str]) -> Result<Option<CountedRow>, LineFormatError> {
        let (local_address, local_port) =
            decode_address_port(fields[1]).map_err(|source| LineFormatError::LocalAddress {
                input: fields[1].to_string(),
                source,
            })?;

        if !self.port_filter.matches(local_port) {
            return Ok(None);
        }

        let (tx_queue, rx_queue) = parse_queues(fields[4])?;

        let state = u64::from_str_radix(fields[3], 16).map_err(|source| LineFormatError::State {
            input: fields[3].to_string(),
            source,
        })?;

        let Inclusion::Included { queue_length } = classify(state) else {
            return Ok(None);
        };

        Ok(Some(CountedRow {
            key: AggregateKey {
                local_address,
                local_port,
            },
            tx_queue,
            rx_queue,
            queue_length,
        }))
    }
}

/// Parse the `tx_queue:rx_queue` column.
fn parse_queues(field: &str) -> Result<(u64, u64), LineFormatError> {
    let mut halves = field.split(':');
    let (Some(tx), Some(rx), None) = (halves.next(), halves.next(), halves.next()) else {
        return Err(LineFormatError::Queues {
            input: field.to_string(),
        });
    };

    let tx_queue = u64::from_str_radix(tx, 16).map_err(|source| LineFormatError::TxQueue {
        input: field.to_string(),
        source,
    })?;
    let rx_queue = u64::from_str_radix(rx, 16).map_err(|source| LineFormatError::RxQueue {
        input: field.to_string(),
        source,
    })?;

    Ok((tx_queue, rx_queue))
}
