//! Port configuration
//!
//! A PortConfiguration holds the full set of negotiated device parameters
//! for one serial port. It is immutable once applied to a live device —
//! reconfiguration replaces the whole struct, never individual fields.

use serde::{Deserialize, Serialize};

/// Parity bit setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

/// RTS line control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RtsControl {
    Disabled,
    Enabled,
    Handshake,
}

/// The full parameter set for one serial port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortConfiguration {
    /// Port identifier, e.g. "COM1" or "/dev/ttyUSB0"
    pub port: String,
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// Data bits per character (5–8)
    pub byte_size: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub rts_control: RtsControl,
    /// Honor CTS for output flow control
    pub cts_flow: bool,
}

impl PortConfiguration {
    /// Default parameters on a specific port.
    pub fn for_port(port: &str) -> Self {
        Self {
            port: port.to_string(),
            ..Self::default()
        }
    }
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            port: "COM1".to_string(),
            baud_rate: 9600,
            byte_size: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            rts_control: RtsControl::Disabled,
            cts_flow: false,
        }
    }
}
