//! Session lifecycle
//!
//! `SessionController` owns the connection state and is the only component
//! that transitions it. It opens the device, applies the stored
//! configuration, splits the handle into a reader half (moved into the
//! receive worker) and a writer half (kept for the transmit path), and
//! signals the worker to stop on disconnect without waiting for it.

mod receive;
mod transmit;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::domain::{
    ConfigError, ConnectError, ConnectionState, PortConfiguration, SessionEvent, WriteError,
};
use crate::ports::{ByteSink, SerialLink, SerialOpen};
use receive::ReceiveLoop;

pub struct SessionController {
    opener: Box<dyn SerialOpen>,
    sink: Arc<dyn ByteSink>,
    config: PortConfiguration,
    state: ConnectionState,
    /// Per-session stop signal; a fresh one is allocated on every connect
    /// so a stale worker can never observe the wrong session's flag.
    cancel: Option<Arc<AtomicBool>>,
    /// Writer half of the device while connected. The reader half lives in
    /// the worker, which closes it itself on exit.
    writer: Option<Box<dyn SerialLink>>,
    worker: Option<JoinHandle<()>>,
    event_tx: Sender<SessionEvent>,
    event_rx: Receiver<SessionEvent>,
}

impl SessionController {
    pub fn new(opener: Box<dyn SerialOpen>, sink: Arc<dyn ByteSink>) -> Self {
        Self::with_configuration(opener, sink, PortConfiguration::default())
    }

    pub fn with_configuration(
        opener: Box<dyn SerialOpen>,
        sink: Arc<dyn ByteSink>,
        config: PortConfiguration,
    ) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            opener,
            sink,
            config,
            state: ConnectionState::Disconnected,
            cancel: None,
            writer: None,
            worker: None,
            event_tx,
            event_rx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn configuration(&self) -> &PortConfiguration {
        &self.config
    }

    /// Notifications for the foreground to drain. The receive worker only
    /// posts here; it never notifies the user directly.
    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.event_rx
    }

    /// Replace the stored configuration wholesale. Takes effect on the
    /// next connect.
    pub fn apply_configuration(&mut self, config: PortConfiguration) -> Result<(), ConfigError> {
        if self.is_connected() {
            return Err(ConfigError::SessionActive);
        }
        self.config = config;
        Ok(())
    }

    /// Change only the port selection, keeping the other parameters.
    pub fn select_port(&mut self, port: &str) -> Result<(), ConfigError> {
        if self.is_connected() {
            return Err(ConfigError::SessionActive);
        }
        self.config.port = port.to_string();
        log::info!("port set to {port}");
        Ok(())
    }

    /// Establish a session on the configured port and start receiving.
    ///
    /// A no-op when already connected: the existing worker keeps running
    /// and no second one is ever spawned. On any failure the state stays
    /// Disconnected and nothing is left half-initialized.
    pub fn connect(&mut self) -> Result<(), ConnectError> {
        if self.is_connected() {
            return Ok(());
        }

        // A previous worker may still be draining its last read. Its stop
        // flag is already raised, so this join is bounded by one read wait;
        // without it two workers could race for the same device.
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        let mut device = self.opener.open(&self.config.port)?;
        device.apply_configuration(&self.config)?;

        // Best-effort: the first bytes delivered must never be leftovers
        // from before the session began.
        if let Err(e) = device.purge_input() {
            log::warn!("could not purge stale input on {}: {e}", self.config.port);
        }

        let reader = device.try_clone()?;
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = ReceiveLoop {
            link: reader,
            cancel: Arc::clone(&cancel),
            sink: Arc::clone(&self.sink),
            events: self.event_tx.clone(),
        }
        .spawn();

        self.writer = Some(device);
        self.cancel = Some(cancel);
        self.worker = Some(worker);
        self.state = ConnectionState::Connected;
        log::info!("connected to {}", self.config.port);
        let _ = self.event_tx.send(SessionEvent::Connected {
            port: self.config.port.clone(),
        });
        Ok(())
    }

    /// End the session. Fire-and-return: raises the worker's stop signal
    /// and comes back immediately without joining it. The worker closes
    /// its own device handle once it observes the signal, within one read
    /// timeout at worst.
    pub fn disconnect(&mut self) {
        if !self.is_connected() {
            return;
        }
        self.state = ConnectionState::Disconnected;
        if let Some(cancel) = &self.cancel {
            cancel.store(true, Ordering::SeqCst);
        }
        // Release the writer half now; the reader half is the worker's.
        self.writer = None;
        log::info!("disconnected from {}", self.config.port);
        let _ = self.event_tx.send(SessionEvent::Disconnected);
    }

    /// Transmit one character. While disconnected, typed input is simply
    /// dropped, not queued and not an error. While connected, blocks
    /// until this single write completes or fails; a failed write leaves
    /// the session connected.
    pub fn send(&mut self, byte: u8) -> Result<(), WriteError> {
        let Some(writer) = self.writer.as_mut() else {
            log::trace!("dropping byte 0x{byte:02x}: not connected");
            return Ok(());
        };
        transmit::send_byte(writer.as_mut(), byte)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.disconnect();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
