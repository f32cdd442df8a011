//! Port traits (interfaces)
//!
//! These traits define the boundaries between the core engine and external
//! I/O. Adapters implement these traits to connect to real hardware.

pub mod serial;
pub mod sink;

pub use serial::*;
pub use sink::*;
