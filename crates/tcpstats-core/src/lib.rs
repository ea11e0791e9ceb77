//! Parser and aggregator for the Linux `/proc/net/tcp` connection table.
#![allow(clippy::uninlined_format_args)] // "variables can be used directly in format!"
#![allow(clippy::doc_markdown)] // "item in documentation missing backticks"
//!
//! Each pass reads the table once, decodes the packed hexadecimal local
//! endpoint, state and queue columns, and folds every row that passes the
//! state policy and the optional port filter into one aggregate per local
//! `address:port`.
//!
//! # Example
//!
//! ```no_run
//! use tcpstats_core::{TcpStats, TracingSink};
//!
//! let stats = TcpStats::new("/proc/net/tcp", "80,443", TracingSink);
//! for entry in stats.get()? {
//!     println!(
//!         "{}:{} tx={} rx={} conns={}",
//!         entry.local_address, entry.local_port, entry.tx_queue, entry.rx_queue, entry.queue_length
//!     );
//! }
//! # Ok::<(), tcpstats_core::TcpStatsError>(())
//! ```

mod address;
mod error;
mod port_filter;
mod state;
mod table;
mod warning;

pub use address::decode_address_port;
pub use error::{DecodeError, FilterTokenError, LineFormatError, TcpStatsError};
pub use port_filter::{parse_port_token, PortFilter};
pub use state::{classify, Inclusion, TcpState};
pub use table::{AggregateKey, TcpStats, TcpStatsResult, DEFAULT_PATH, MIN_FIELDS};
pub use warning::{CollectingSink, NopSink, TracingSink, Warning, WarningSink};
