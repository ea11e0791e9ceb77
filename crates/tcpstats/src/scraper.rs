//! One scrape: read the connection table and record metric data points.

use std::path::{Path, PathBuf};

use tcpstats_core::{TcpStats, TracingSink, WarningSink};

use crate::config::Config;
use crate::error::ScrapeError;
use crate::metrics::{Direction, Metrics, MetricsBuilder, Timestamp};

/// Turns connection table aggregates into [`Metrics`].
#[derive(Debug)]
pub struct Scraper<W = TracingSink> {
    metrics_builder: MetricsBuilder,
    tcp_stats: TcpStats<W>,
}

impl Scraper<TracingSink> {
    /// Scraper for a validated config, logging row warnings through `tracing`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MetricsBuilder::new(config.metrics),
            config.path.clone(),
            &config.portfilter,
            TracingSink,
        )
    }
}

impl<W: WarningSink> Scraper<W> {
    pub fn new(
        metrics_builder: MetricsBuilder,
        path: impl Into<PathBuf>,
        port_filter: &str,
        sink: W,
    ) -> Self {
        Self {
            metrics_builder,
            tcp_stats: TcpStats::new(path, port_filter, sink),
        }
    }

    pub fn path(&self) -> &Path {
        self.tcp_stats.path()
    }

    pub fn tcp_stats(&self) -> &TcpStats<W> {
        &self.tcp_stats
    }

    /// Scrape now.
    pub fn scrape(&mut self) -> Result<Metrics, ScrapeError> {
        self.scrape_at(Timestamp::now())
    }

    /// Scrape, stamping every data point with `now`.
    pub fn scrape_at(&mut self, now: Timestamp) -> Result<Metrics, ScrapeError> {
        tracing::debug!(path = %self.path().display(), "Scraping TCP stats");

        let stats = self.tcp_stats.get()?;

        tracing::debug!(count = stats.len(), "Found TCP stats");

        for stat in &stats {
            self.metrics_builder.record_tcp_queue_size_data_point(
                now,
                stat.tx_queue,
                &stat.local_address,
                stat.local_port,
                Direction::Tx,
            );
            self.metrics_builder.record_tcp_queue_size_data_point(
                now,
                stat.rx_queue,
                &stat.local_address,
                stat.local_port,
                Direction::Rx,
            );
            self.metrics_builder.record_tcp_queue_length_data_point(
                now,
                stat.queue_length,
                &stat.local_address,
                stat.local_port,
            );
        }

        let metrics = self.metrics_builder.emit();

        tracing::debug!(
            metric_count = metrics.metric_count(),
            data_point_count = metrics.data_point_count(),
            "Emitting TCP stats"
        );

        Ok(metrics)
    }
}
