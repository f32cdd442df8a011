//! Background receive loop
//!
//! One worker thread per session. Each iteration checks the cancellation
//! signal, then issues one bounded read against the device: data goes to
//! the sink, a timeout loops back around, a failure ends the loop. The
//! worker owns the reader half of the device for its whole lifetime and is
//! the only component that closes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use crate::domain::{SessionEvent, RECV_CHUNK_SIZE};
use crate::ports::{ByteSink, SerialLink};

pub(crate) struct ReceiveLoop {
    pub(crate) link: Box<dyn SerialLink>,
    pub(crate) cancel: Arc<AtomicBool>,
    pub(crate) sink: Arc<dyn ByteSink>,
    pub(crate) events: Sender<SessionEvent>,
}

impl ReceiveLoop {
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn run(mut self) {
        // Scratch area only; the sink is always handed exactly the bytes
        // one completed read produced.
        let mut scratch = [0u8; RECV_CHUNK_SIZE];

        loop {
            // Cancellation checkpoint, before committing to another wait.
            if self.cancel.load(Ordering::SeqCst) {
                log::debug!("receive loop: stop requested, shutting down");
                break;
            }

            match self.link.read(&mut scratch) {
                // Wait elapsed with no data. Invisible to the user.
                Ok(0) => continue,
                Ok(n) => self.sink.deliver(&scratch[..n]),
                Err(e) => {
                    // Terminal for this loop only; reported once, never retried.
                    log::error!("receive loop: {e}");
                    let _ = self.events.send(SessionEvent::ReceiveFailed {
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        // The worker closes its own handle. The controller never does, so a
        // close can't race an in-flight read.
        drop(self.link);
        let _ = self.events.send(SessionEvent::ReceiverStopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_serial::MockSerialLink;
    use crossbeam_channel::unbounded;
    use std::sync::Mutex;
    use std::time::Duration;

    struct CollectSink(Mutex<Vec<u8>>);

    impl ByteSink for CollectSink {
        fn deliver(&self, bytes: &[u8]) {
            self.0.lock().unwrap().extend_from_slice(bytes);
        }
    }

    fn start(
        device: &MockSerialLink,
    ) -> (
        Arc<AtomicBool>,
        Arc<CollectSink>,
        crossbeam_channel::Receiver<SessionEvent>,
        JoinHandle<()>,
    ) {
        let cancel = Arc::new(AtomicBool::new(false));
        let sink = Arc::new(CollectSink(Mutex::new(Vec::new())));
        let (tx, rx) = unbounded();
        let handle = ReceiveLoop {
            link: device.try_clone().unwrap(),
            cancel: Arc::clone(&cancel),
            sink: Arc::clone(&sink) as Arc<dyn ByteSink>,
            events: tx,
        }
        .spawn();
        (cancel, sink, rx, handle)
    }

    #[test]
    fn forwards_exactly_the_bytes_read() {
        let device = MockSerialLink::new();
        let (cancel, sink, _rx, handle) = start(&device);

        device.push_incoming(b"OK\r\n");
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while sink.0.lock().unwrap().len() < 4 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(*sink.0.lock().unwrap(), b"OK\r\n");

        cancel.store(true, Ordering::SeqCst);
        handle.join().unwrap();
    }

    #[test]
    fn cancellation_stops_the_loop_and_releases_the_handle() {
        let device = MockSerialLink::new();
        let (cancel, _sink, rx, handle) = start(&device);

        cancel.store(true, Ordering::SeqCst);
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            SessionEvent::ReceiverStopped
        );
        handle.join().unwrap();
        // Only the test's own handle remains
        assert_eq!(device.handles(), 1);
    }

    #[test]
    fn read_failure_is_reported_once_and_ends_the_loop() {
        let device = MockSerialLink::new();
        let (_cancel, _sink, rx, handle) = start(&device);

        device.set_read_failure(true);
        match rx.recv_timeout(Duration::from_secs(1)).unwrap() {
            SessionEvent::ReceiveFailed { reason } => {
                assert!(reason.contains("simulated device failure"))
            }
            other => panic!("expected ReceiveFailed, got {other:?}"),
        }
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            SessionEvent::ReceiverStopped
        );
        handle.join().unwrap();
    }
}
