//! Error types for tcpstats-core.

use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors for a whole aggregation pass.
///
/// Only source access failures end a pass; row-level problems are reported
/// through a [`crate::WarningSink`] and skipped.
#[derive(Debug, Error)]
pub enum TcpStatsError {
    /// The connection table could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading failed part way through the table.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A packed `HEXADDR:HEXPORT` token could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The token does not split into exactly two halves on `:`.
    #[error("invalid IP:Port format")]
    Format,

    /// The address half is not a 32-bit hexadecimal number.
    #[error("invalid address: {0}")]
    Address(#[source] ParseIntError),

    /// The port half is not a 16-bit hexadecimal number.
    #[error("invalid port: {0}")]
    Port(#[source] ParseIntError),
}

/// Recoverable problem with a single row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineFormatError {
    /// Local endpoint column could not be decoded.
    #[error("error parsing local address and port '{input}': {source}")]
    LocalAddress {
        input: String,
        #[source]
        source: DecodeError,
    },

    /// Queue column is not a `tx:rx` pair.
    #[error("error parsing queues '{input}'")]
    Queues { input: String },

    /// Transmit half of the queue column is not hexadecimal.
    #[error("error parsing tx queue '{input}': {source}")]
    TxQueue {
        input: String,
        #[source]
        source: ParseIntError,
    },

    /// Receive half of the queue column is not hexadecimal.
    #[error("error parsing rx queue '{input}': {source}")]
    RxQueue {
        input: String,
        #[source]
        source: ParseIntError,
    },

    /// State column is not hexadecimal.
    #[error("error parsing status '{input}': {source}")]
    State {
        input: String,
        #[source]
        source: ParseIntError,
    },
}

impl LineFormatError {
    /// The raw column text that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            Self::LocalAddress { input, .. }
            | Self::Queues { input }
            | Self::TxQueue { input, .. }
            | Self::RxQueue { input, .. }
            | Self::State { input, .. } => input,
        }
    }
}

/// One token of a port filter string is not a base-10 integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error parsing port filter '{token}': {source}")]
pub struct FilterTokenError {
    pub token: String,
    #[source]
    pub source: ParseIntError,
}
