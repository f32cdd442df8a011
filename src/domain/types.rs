//! Session state, events, and timing constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long one receive wait may block before the cancellation signal is
/// re-checked. Worst-case disconnect latency is one of these intervals
/// plus the cost of issuing one read.
pub const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Receive scratch buffer size. A completed read delivers at most this
/// many bytes; the sink always receives exactly the count actually read.
pub const RECV_CHUNK_SIZE: usize = 80;

/// Whether a session is currently established.
///
/// Owned by the SessionController; nothing else transitions it. The
/// background receive loop never reads this directly; it observes shutdown
/// through its own cancellation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Information about a serial port present on the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialPortInfo {
    pub name: String,
    pub port_type: String,
}

/// Notifications posted by the engine onto the session event channel.
///
/// The background worker never performs user-visible notification itself.
/// It posts here, and the foreground drains the channel and decides how to
/// surface each event (dialog, status line, log, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connected { port: String },
    Disconnected,
    /// A read failed; the receive loop has stopped. One-shot per session.
    ReceiveFailed { reason: String },
    /// The receive loop has exited and released its device handle.
    ReceiverStopped,
}
