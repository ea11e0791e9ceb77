//! tcpstats: report per-socket TCP queue metrics from /proc/net/tcp
//!
//! Run: cargo run -p tcpstats --bin tcpstats -- --once --pretty

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use tcpstats::config::{parse_duration, Config};
use tcpstats::metrics::Metrics;
use tcpstats::receiver::Receiver;
use tcpstats::scraper::Scraper;

/// TCP queue size and queue length per local address and port
#[derive(Parser)]
#[command(name = "tcpstats", version, about, long_about = None)]
struct Cli {
    /// Path to config file (YAML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Connection table to read (overrides config)
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Comma separated local ports to report, e.g. "22,8005" (overrides config)
    #[arg(short = 'f', long, value_name = "PORTS")]
    port_filter: Option<String>,

    /// Collection interval, e.g. "10s" or "1m30s" (overrides config)
    #[arg(short, long, value_name = "DURATION", value_parser = parse_duration)]
    interval: Option<Duration>,

    /// Scrape once, print and exit
    #[arg(long)]
    once: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Dump default configuration to stdout and exit
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    fn config(&self) -> Result<Config, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };
        if let Some(path) = &self.path {
            config.path.clone_from(path);
        }
        if let Some(filter) = &self.port_filter {
            config.portfilter.clone_from(filter);
        }
        if let Some(interval) = self.interval {
            config.collection_interval = interval;
        }
        config.validate()?;
        Ok(config)
    }
}

fn render(metrics: &Metrics, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(metrics)
    } else {
        serde_json::to_string(metrics)
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.config()?;
    tracing::debug!(?config, "Loaded config");

    if cli.once {
        let metrics = Scraper::from_config(&config).scrape()?;
        println!("{}", render(&metrics, cli.pretty)?);
        return Ok(());
    }

    let pretty = cli.pretty;
    let handle = Receiver::new(&config).start(move |metrics: Metrics| {
        match render(&metrics, pretty) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to encode metrics"),
        }
    })?;
    handle.wait();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.dump_config {
        println!("{}", Config::default_yaml());
        return ExitCode::SUCCESS;
    }

    tcpstats::logging::init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
