//! tcpstats-holdserver: TCP server that holds each connection before replying
//!
//! Point clients at it to build up receive and accept queues, then watch
//! them with `tcpstats --port-filter 8005`.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use tcpstats::holdserver::{HoldServer, DEFAULT_LISTEN_ADDR};

/// Slow "Hello, World!" server for exercising TCP queues
#[derive(Parser)]
#[command(name = "tcpstats-holdserver", version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    listen_addr: String,

    /// Seconds to hold each connection before responding
    #[arg(long, default_value = "5")]
    sleep_seconds: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tcpstats::logging::init();

    let server = match HoldServer::bind(&cli.listen_addr, Duration::from_secs(cli.sleep_seconds)) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Error: failed to listen on {}: {e}", cli.listen_addr);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(addr = %cli.listen_addr, "Server listening");
    server.serve()
}
