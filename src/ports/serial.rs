//! Serial device traits
//!
//! Split into two traits:
//! - `SerialOpen` — opens a port by name, returning a boxed link
//! - `SerialLink` — instance methods on one open device handle
//!
//! Both sides of the request/completion model are folded into the return
//! value: a read or write that the device has accepted but not yet finished
//! reports `Ok(0)`, which callers must treat as "still pending" rather than
//! as a failure. Genuine failures come back as errors.

use crate::domain::{ConfigError, OpenError, PortConfiguration, ReadError, WriteError};

/// Factory for opening serial devices.
pub trait SerialOpen: Send {
    /// Open the named port with exclusive read/write access.
    fn open(&self, port: &str) -> Result<Box<dyn SerialLink>, OpenError>;
}

/// One open serial device handle.
///
/// Only requires `Send` — a link is owned by exactly one thread at a time.
/// Closing is dropping: each half obtained from `try_clone` is released by
/// whichever component owns it, so a handle can never be closed twice.
pub trait SerialLink: Send {
    /// Read up to `buf.len()` bytes. `Ok(0)` means the bounded wait elapsed
    /// with no data: the caller's cancellation checkpoint, not an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError>;

    /// Write bytes. `Ok(0)` means the operation is still pending and the
    /// caller should retry; `Ok(n)` means `n` bytes completed.
    fn write(&mut self, buf: &[u8]) -> Result<usize, WriteError>;

    /// Discard any input already buffered by the OS, so a new session never
    /// starts by delivering leftovers from before it began.
    fn purge_input(&mut self) -> Result<(), ReadError>;

    /// Overwrite the device's line parameters with `cfg`.
    fn apply_configuration(&mut self, cfg: &PortConfiguration) -> Result<(), ConfigError>;

    /// Second handle to the same device, used to split one port into a
    /// reader half and a writer half owned by different threads.
    fn try_clone(&self) -> Result<Box<dyn SerialLink>, OpenError>;
}
