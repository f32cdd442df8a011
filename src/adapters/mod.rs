//! Adapters (external I/O)
//!
//! Implementations of the port traits: the real `serialport`-backed device
//! and an in-memory mock for development and tests.

pub mod mock_serial;
pub mod serial_port;
