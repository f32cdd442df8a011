//! Mock serial device for development and testing without hardware.
//!
//! Activate in the console front-end by setting MOCK_SERIAL=1:
//!
//!   MOCK_SERIAL=1 RUST_LOG=dumbterm=info cargo run -- COM1
//!
//! With loopback enabled every transmitted byte is queued straight back as
//! received data, so the terminal echoes whatever is typed. Tests drive the
//! same struct directly: they keep one handle and hand clones to the engine,
//! then inject incoming bytes and inspect what was written.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::domain::{ConfigError, OpenError, PortConfiguration, ReadError, WriteError};
use crate::ports::{SerialLink, SerialOpen};

/// Default simulated wait before a read reports "no data yet". Kept short
/// so cancellation latency is observable in tests without real 500 ms waits.
const DEFAULT_POLL: Duration = Duration::from_millis(10);

struct Inner {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
    applied: Vec<PortConfiguration>,
    pending_writes: usize,
    opens: usize,
    loopback: bool,
    fail_open: bool,
    fail_reads: bool,
    fail_writes: bool,
    reject_config: bool,
}

/// In-memory serial device. Clones share one underlying "port", which is
/// exactly how `try_clone` behaves on a real handle.
#[derive(Clone)]
pub struct MockSerialLink {
    shared: Arc<(Mutex<Inner>, Condvar)>,
    poll: Duration,
}

impl MockSerialLink {
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL)
    }

    pub fn with_poll_interval(poll: Duration) -> Self {
        let inner = Inner {
            incoming: VecDeque::new(),
            written: Vec::new(),
            applied: Vec::new(),
            pending_writes: 0,
            opens: 0,
            loopback: false,
            fail_open: false,
            fail_reads: false,
            fail_writes: false,
            reject_config: false,
        };
        Self {
            shared: Arc::new((Mutex::new(inner), Condvar::new())),
            poll,
        }
    }

    /// Queue bytes as if the device had sent them.
    pub fn push_incoming(&self, bytes: &[u8]) {
        let (lock, cvar) = &*self.shared;
        lock.lock().unwrap().incoming.extend(bytes.iter().copied());
        cvar.notify_all();
    }

    /// Everything written to the device so far.
    pub fn written(&self) -> Vec<u8> {
        self.shared.0.lock().unwrap().written.clone()
    }

    /// Configurations applied to the device, in order.
    pub fn applied(&self) -> Vec<PortConfiguration> {
        self.shared.0.lock().unwrap().applied.clone()
    }

    /// How many times this device has been opened through `SerialOpen`.
    pub fn opens(&self) -> usize {
        self.shared.0.lock().unwrap().opens
    }

    /// Live handles to the underlying port, this one included. Drops to 1
    /// once the engine has released both halves.
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.shared)
    }

    /// Echo every written byte back as incoming data.
    pub fn set_loopback(&self, on: bool) {
        self.shared.0.lock().unwrap().loopback = on;
    }

    /// Make `SerialOpen::open` fail with `OpenError::NotFound`.
    pub fn set_open_failure(&self, on: bool) {
        self.shared.0.lock().unwrap().fail_open = on;
    }

    /// Make every subsequent read fail.
    pub fn set_read_failure(&self, on: bool) {
        let (lock, cvar) = &*self.shared;
        lock.lock().unwrap().fail_reads = on;
        cvar.notify_all();
    }

    /// Make every subsequent write fail.
    pub fn set_write_failure(&self, on: bool) {
        self.shared.0.lock().unwrap().fail_writes = on;
    }

    /// The next `n` writes report "still pending" before one completes.
    pub fn set_pending_writes(&self, n: usize) {
        self.shared.0.lock().unwrap().pending_writes = n;
    }

    /// Make `apply_configuration` fail with `ConfigError::Rejected`.
    pub fn set_config_rejection(&self, on: bool) {
        self.shared.0.lock().unwrap().reject_config = on;
    }
}

impl Default for MockSerialLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialOpen for MockSerialLink {
    fn open(&self, port: &str) -> Result<Box<dyn SerialLink>, OpenError> {
        let mut inner = self.shared.0.lock().unwrap();
        if inner.fail_open {
            return Err(OpenError::NotFound(port.to_string()));
        }
        inner.opens += 1;
        log::info!("[MOCK SERIAL] opened {port} (loopback={})", inner.loopback);
        Ok(Box::new(self.clone()))
    }
}

impl SerialLink for MockSerialLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        let (lock, cvar) = &*self.shared;
        let mut inner = lock.lock().unwrap();

        if inner.incoming.is_empty() && !inner.fail_reads {
            let (guard, _timed_out) = cvar.wait_timeout(inner, self.poll).unwrap();
            inner = guard;
        }
        if inner.fail_reads {
            return Err(ReadError::IoFailure("simulated device failure".into()));
        }

        let n = buf.len().min(inner.incoming.len());
        for slot in buf.iter_mut().take(n) {
            *slot = inner.incoming.pop_front().unwrap();
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, WriteError> {
        let (lock, cvar) = &*self.shared;
        let mut inner = lock.lock().unwrap();

        if inner.fail_writes {
            return Err(WriteError::IoFailure("simulated device failure".into()));
        }
        if inner.pending_writes > 0 {
            inner.pending_writes -= 1;
            return Ok(0);
        }

        inner.written.extend_from_slice(buf);
        if inner.loopback {
            inner.incoming.extend(buf.iter().copied());
            cvar.notify_all();
        }
        log::debug!("[MOCK SERIAL] wrote {} byte(s)", buf.len());
        Ok(buf.len())
    }

    fn purge_input(&mut self) -> Result<(), ReadError> {
        self.shared.0.lock().unwrap().incoming.clear();
        Ok(())
    }

    fn apply_configuration(&mut self, cfg: &PortConfiguration) -> Result<(), ConfigError> {
        let mut inner = self.shared.0.lock().unwrap();
        if inner.reject_config {
            return Err(ConfigError::Rejected("simulated rejection".into()));
        }
        inner.applied.push(cfg.clone());
        Ok(())
    }

    fn try_clone(&self) -> Result<Box<dyn SerialLink>, OpenError> {
        Ok(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_returns_queued_bytes_up_to_buffer_size() {
        let mut link = MockSerialLink::new();
        link.push_incoming(b"hello");

        let mut buf = [0u8; 3];
        assert_eq!(link.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");

        let mut buf = [0u8; 8];
        assert_eq!(link.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"lo");
    }

    #[test]
    fn read_times_out_with_zero_when_idle() {
        let mut link = MockSerialLink::with_poll_interval(Duration::from_millis(1));
        let mut buf = [0u8; 4];
        assert_eq!(link.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn loopback_echoes_writes() {
        let mut link = MockSerialLink::new();
        link.set_loopback(true);
        link.write(b"A").unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(link.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'A');
    }

    #[test]
    fn pending_writes_report_zero_then_complete() {
        let mut link = MockSerialLink::new();
        link.set_pending_writes(2);
        assert_eq!(link.write(b"A").unwrap(), 0);
        assert_eq!(link.write(b"A").unwrap(), 0);
        assert_eq!(link.write(b"A").unwrap(), 1);
        assert_eq!(link.written(), b"A");
    }

    #[test]
    fn purge_discards_buffered_input() {
        let mut link = MockSerialLink::new();
        link.push_incoming(b"stale");
        link.purge_input().unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(link.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn clones_share_the_port() {
        let link = MockSerialLink::new();
        let mut reader = link.try_clone().unwrap();
        link.push_incoming(b"x");

        let mut buf = [0u8; 1];
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'x');
    }
}
