//! Transmit path: one keystroke, one write
//!
//! There is no write queue. The caller holds the only writer half of the
//! device, so at most one write is ever outstanding — one keystroke
//! produces one write, and the foreground blocks until it completes.

use crate::domain::WriteError;
use crate::ports::SerialLink;

/// Send a single byte, blocking until the device reports completion.
///
/// A pending write (`Ok(0)`) is the expected asynchronous branch, not an
/// error. The wait has no deadline: a keystroke's write either completes
/// or fails, it is never abandoned mid-flight.
pub(crate) fn send_byte(link: &mut dyn SerialLink, byte: u8) -> Result<(), WriteError> {
    loop {
        if link.write(&[byte])? > 0 {
            return Ok(());
        }
        // Still pending; wait out the next completion window.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_serial::MockSerialLink;

    #[test]
    fn completes_immediately_when_the_device_accepts() {
        let mut link = MockSerialLink::new();
        send_byte(&mut link, b'A').unwrap();
        assert_eq!(link.written(), b"A");
    }

    #[test]
    fn retries_while_pending_then_completes() {
        let mut link = MockSerialLink::new();
        link.set_pending_writes(3);
        send_byte(&mut link, b'Z').unwrap();
        assert_eq!(link.written(), b"Z");
    }

    #[test]
    fn propagates_device_failure() {
        let mut link = MockSerialLink::new();
        link.set_write_failure(true);
        let err = send_byte(&mut link, b'A').unwrap_err();
        assert!(matches!(err, WriteError::IoFailure(_)));
        assert!(link.written().is_empty());
    }
}
