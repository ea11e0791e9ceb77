//! TCP connection states and the aggregation policy applied to them.

/// TCP connection state (from Linux kernel `include/net/tcp_states.h`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum TcpState {
    Unknown = 0,
    Established = 1,
    SynSent = 2,
    SynRecv = 3,
    FinWait1 = 4,
    FinWait2 = 5,
    TimeWait = 6,
    Close = 7,
    CloseWait = 8,
    LastAck = 9,
    Listen = 10,
    Closing = 11,
}

impl TcpState {
    /// Map a numeric state code to a known state.
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Self::Unknown,
            1 => Self::Established,
            2 => Self::SynSent,
            3 => Self::SynRecv,
            4 => Self::FinWait1,
            5 => Self::FinWait2,
            6 => Self::TimeWait,
            7 => Self::Close,
            8 => Self::CloseWait,
            9 => Self::LastAck,
            10 => Self::Listen,
            11 => Self::Closing,
            _ => return None,
        })
    }

    /// Numeric code as printed (in hex) in `/proc/net/tcp`.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Get display name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Established => "ESTABLISHED",
            Self::SynSent => "SYN_SENT",
            Self::SynRecv => "SYN_RECV",
            Self::FinWait1 => "FIN_WAIT1",
            Self::FinWait2 => "FIN_WAIT2",
            Self::TimeWait => "TIME_WAIT",
            Self::Close => "CLOSE",
            Self::CloseWait => "CLOSE_WAIT",
            Self::LastAck => "LAST_ACK",
            Self::Listen => "LISTEN",
            Self::Closing => "CLOSING",
        }
    }
}

impl std::fmt::Display for TcpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a row is aggregated, and what it adds to the connection count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// Row is dropped.
    Excluded,
    /// Row is aggregated; `queue_length` is added to the connection count.
    Included { queue_length: u64 },
}

/// Classify a raw state code.
///
/// Everything below `TIME_WAIT` is live and counts as one connection.
/// `LISTEN` sits above that threshold numerically but is still aggregated so
/// its queue bytes are reported; it adds nothing to the connection count
/// because a listening socket is not itself a connection.
///
/// Takes the full 64-bit column value so that oversized codes are excluded
/// rather than rejected as malformed.
pub const fn classify(code: u64) -> Inclusion {
    const TIME_WAIT: u64 = TcpState::TimeWait.code() as u64;
    const LISTEN: u64 = TcpState::Listen.code() as u64;

    if code == LISTEN {
        Inclusion::Included { queue_length: 0 }
    } else if code < TIME_WAIT {
        Inclusion::Included { queue_length: 1 }
    } else {
        Inclusion::Excluded
    }
}
