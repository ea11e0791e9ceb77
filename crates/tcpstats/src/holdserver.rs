//! Slow TCP server for building up connection queues by hand.
//!
//! Every accepted connection is held for a fixed time before it is answered
//! with `Hello, World!`. The wait happens on the accept loop itself, so
//! clients that connect meanwhile pile up in the listen backlog and their
//! data sits in the receive queue, which is what the receiver reports.

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Reply sent to every client.
pub const GREETING: &[u8] = b"Hello, World!\n";

/// Default listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8005";

#[derive(Debug)]
pub struct HoldServer {
    listener: TcpListener,
    hold: Duration,
}

impl HoldServer {
    /// Bind to `addr`, answering each connection after `hold`.
    pub fn bind(addr: impl ToSocketAddrs, hold: Duration) -> io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr)?,
            hold,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever. Accept errors are logged and skipped.
    pub fn serve(&self) -> ! {
        loop {
            if let Err(e) = self.accept_one() {
                tracing::warn!(error = %e, "Failed to accept connection");
            }
        }
    }

    /// Accept one connection, hold it, then answer it on a new thread.
    pub fn accept_one(&self) -> io::Result<JoinHandle<()>> {
        let (stream, peer) = self.listener.accept()?;
        tracing::info!(%peer, "Connection received");

        tracing::info!(seconds = self.hold.as_secs_f64(), "Holding before responding");
        thread::sleep(self.hold);

        Ok(thread::spawn(move || handle_connection(stream)))
    }
}

fn handle_connection(mut stream: TcpStream) {
    if let Err(e) = stream.write_all(GREETING) {
        tracing::warn!(error = %e, "Failed to write to connection");
        return;
    }
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        tracing::warn!(error = %e, "Failed to close connection");
        return;
    }
    tracing::info!("Connection handled successfully");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_greets_after_hold() {
        let server = HoldServer::bind("127.0.0.1:0", Duration::from_millis(20)).unwrap();
        let addr = server.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            let mut reply = Vec::new();
            stream.read_to_end(&mut reply).unwrap();
            reply
        });

        server.accept_one().unwrap().join().unwrap();
        assert_eq!(client.join().unwrap(), GREETING);
    }

    #[test]
    fn test_bind_reports_port() {
        let server = HoldServer::bind("127.0.0.1:0", Duration::ZERO).unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }
}
