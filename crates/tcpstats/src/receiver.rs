//! Background scraping on a fixed interval.
//!
//! The receiver owns a [`Scraper`] and runs it on a dedicated thread: one
//! scrape after `initial_delay`, then one every `collection_interval`. Each
//! batch goes to a [`MetricsConsumer`]. A failed scrape is logged and the
//! schedule continues.

use std::io;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tcpstats_core::{TracingSink, WarningSink};

use crate::config::Config;
use crate::metrics::Metrics;
use crate::scraper::Scraper;

/// Downstream of the receiver.
pub trait MetricsConsumer: Send + 'static {
    fn consume(&mut self, metrics: Metrics);
}

impl<F> MetricsConsumer for F
where
    F: FnMut(Metrics) + Send + 'static,
{
    fn consume(&mut self, metrics: Metrics) {
        self(metrics);
    }
}

/// Scraper plus its schedule, ready to [`start`](Self::start).
#[derive(Debug)]
pub struct Receiver<W = TracingSink> {
    scraper: Scraper<W>,
    initial_delay: Duration,
    collection_interval: Duration,
}

impl Receiver<TracingSink> {
    /// Receiver for a validated config.
    pub fn new(config: &Config) -> Self {
        Self::with_scraper(
            Scraper::from_config(config),
            config.initial_delay,
            config.collection_interval,
        )
    }
}

impl<W: WarningSink + 'static> Receiver<W> {
    pub fn with_scraper(
        scraper: Scraper<W>,
        initial_delay: Duration,
        collection_interval: Duration,
    ) -> Self {
        Self {
            scraper,
            initial_delay,
            collection_interval,
        }
    }

    /// Spawn the scrape thread.
    pub fn start<C: MetricsConsumer>(self, consumer: C) -> io::Result<ReceiverHandle> {
        let stop = Arc::new(StopSignal::default());
        let thread_stop = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("tcpstats-scraper".to_string())
            .spawn(move || self.run(&thread_stop, consumer))?;

        Ok(ReceiverHandle {
            stop,
            thread: Some(thread),
        })
    }

    fn run<C: MetricsConsumer>(mut self, stop: &StopSignal, mut consumer: C) {
        tracing::info!(
            path = %self.scraper.path().display(),
            interval = ?self.collection_interval,
            "Starting TCP stats receiver"
        );

        if !stop.wait(self.initial_delay) {
            loop {
                match self.scraper.scrape() {
                    Ok(metrics) => consumer.consume(metrics),
                    Err(e) => tracing::error!(error = %e, "Scrape failed"),
                }
                if stop.wait(self.collection_interval) {
                    break;
                }
            }
        }

        tracing::info!("TCP stats receiver stopped");
    }
}

/// Stop flag the scrape thread sleeps on.
#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    cvar: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.cvar.notify_all();
    }

    /// Sleep up to `timeout`. Returns true if stopped.
    fn wait(&self, timeout: Duration) -> bool {
        let guard = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .cvar
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Running receiver. Dropping it stops the thread.
#[derive(Debug)]
pub struct ReceiverHandle {
    stop: Arc<StopSignal>,
    thread: Option<JoinHandle<()>>,
}

impl ReceiverHandle {
    /// Stop scraping and wait for the thread to exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    /// Block on the scrape thread. It only exits early if a consumer panics.
    pub fn wait(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("TCP stats receiver thread panicked");
            }
        }
    }

    fn stop_and_join(&mut self) {
        self.stop.stop();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("TCP stats receiver thread panicked");
            }
        }
    }
}

impl Drop for ReceiverHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
