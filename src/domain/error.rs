//! Domain error types

use thiserror::Error;

/// Failures opening a serial device.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("port not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),
}

/// Failures applying or changing a port configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("device rejected configuration: {0}")]
    Rejected(String),

    #[error("cannot change configuration while a session is active")]
    SessionActive,
}

/// Failures on the receive side. A wait that times out with no data is
/// not an error and never produces one of these.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("read failed: {0}")]
    IoFailure(String),
}

/// Failures on the transmit side.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("write failed: {0}")]
    IoFailure(String),
}

/// Failures establishing a session. Either stage aborts the connect
/// attempt and leaves the session disconnected.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("port unavailable: {0}")]
    PortUnavailable(#[from] OpenError),

    #[error("configuration rejected: {0}")]
    ConfigRejected(#[from] ConfigError),
}
