//! Periodic TCP queue metrics from the Linux connection table.
#![allow(clippy::uninlined_format_args)] // "variables can be used directly in format!"
#![allow(clippy::doc_markdown)] // "item in documentation missing backticks"
//!
//! This crate wires [`tcpstats_core`] into a metrics pipeline:
//!
//! - [`config`]: YAML configuration and its validation
//! - [`metrics`]: metric data model and the builder that records data points
//! - [`scraper`]: one aggregation pass turned into a [`metrics::Metrics`] batch
//! - [`receiver`]: background thread scraping on a fixed interval
//! - [`holdserver`]: slow TCP server for building up queues by hand
//!
//! # Example
//!
//! ```no_run
//! use tcpstats::{config::Config, receiver::Receiver};
//!
//! let config = Config::default();
//! config.validate()?;
//! let handle = Receiver::new(&config).start(|metrics: tcpstats::metrics::Metrics| {
//!     println!("{} data points", metrics.data_point_count());
//! })?;
//! handle.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
mod error;
pub mod holdserver;
pub mod logging;
pub mod metrics;
pub mod receiver;
pub mod scraper;

pub use error::{ConfigError, ScrapeError};
