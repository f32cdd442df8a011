//! Serial port adapter using the `serialport` crate
//!
//! Implements `SerialOpen` and `SerialLink`. Think of `SystemSerial` like a
//! Python classmethod container — it has no instance data, just static
//! methods for listing ports plus the factory method the engine calls.
//!
//! The `serialport` crate reports an elapsed read/write timeout as an
//! `io::ErrorKind::TimedOut` error. This adapter folds that (and
//! `WouldBlock`) back into `Ok(0)`, because for this engine "no completion
//! yet" is the expected asynchronous branch, not a failure.

use std::io::{Read, Write};

use crate::domain::{
    ConfigError, OpenError, Parity, PortConfiguration, ReadError, RtsControl, SerialPortInfo,
    StopBits, WriteError, READ_TIMEOUT,
};
use crate::ports::{SerialLink, SerialOpen};

/// Zero-sized factory for opening system serial ports.
pub struct SystemSerial;

impl SystemSerial {
    /// List serial ports present on the system.
    pub fn list_ports() -> Result<Vec<SerialPortInfo>, OpenError> {
        let ports = serialport::available_ports()
            .map_err(|e| OpenError::AccessDenied(format!("failed to list ports: {e}")))?;

        Ok(ports
            .into_iter()
            .map(|p| {
                let port_type = match &p.port_type {
                    serialport::SerialPortType::UsbPort(info) => {
                        format!("USB ({:04X}:{:04X})", info.vid, info.pid)
                    }
                    serialport::SerialPortType::PciPort => "PCI".to_string(),
                    serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                    serialport::SerialPortType::Unknown => "Native".to_string(),
                };
                SerialPortInfo {
                    name: p.port_name,
                    port_type,
                }
            })
            .collect())
    }
}

impl SerialOpen for SystemSerial {
    fn open(&self, port: &str) -> Result<Box<dyn SerialLink>, OpenError> {
        // Opened at a provisional rate; the session applies the real
        // parameters through apply_configuration immediately after.
        let serial = serialport::new(port, 9600)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| map_open_error(port, e))?;

        Ok(Box::new(SystemSerialLink { port: serial }))
    }
}

fn map_open_error(port: &str, e: serialport::Error) -> OpenError {
    match e.kind() {
        serialport::ErrorKind::NoDevice => OpenError::NotFound(port.to_string()),
        serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
            OpenError::NotFound(port.to_string())
        }
        _ => OpenError::AccessDenied(format!("{port}: {e}")),
    }
}

/// An open serial device wrapping the `serialport` crate.
pub struct SystemSerialLink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialLink for SystemSerialLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if is_pending(&e) => Ok(0),
            Err(e) => Err(ReadError::IoFailure(e.to_string())),
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, WriteError> {
        match self.port.write(buf) {
            Ok(n) => Ok(n),
            Err(e) if is_pending(&e) => Ok(0),
            Err(e) => Err(WriteError::IoFailure(e.to_string())),
        }
    }

    fn purge_input(&mut self) -> Result<(), ReadError> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(|e| ReadError::IoFailure(format!("purge failed: {e}")))
    }

    fn apply_configuration(&mut self, cfg: &PortConfiguration) -> Result<(), ConfigError> {
        let data_bits = data_bits(cfg.byte_size)
            .ok_or_else(|| ConfigError::Rejected(format!("unsupported byte size: {}", cfg.byte_size)))?;

        self.port.set_baud_rate(cfg.baud_rate).map_err(reject)?;
        self.port.set_data_bits(data_bits).map_err(reject)?;
        self.port.set_parity(parity(cfg.parity)).map_err(reject)?;
        self.port.set_stop_bits(stop_bits(cfg.stop_bits)).map_err(reject)?;
        self.port
            .set_flow_control(flow_control(cfg))
            .map_err(reject)?;
        Ok(())
    }

    fn try_clone(&self) -> Result<Box<dyn SerialLink>, OpenError> {
        let port = self
            .port
            .try_clone()
            .map_err(|e| OpenError::AccessDenied(format!("could not clone handle: {e}")))?;
        Ok(Box::new(SystemSerialLink { port }))
    }
}

/// An elapsed timeout or would-block is "operation pending", not a failure.
fn is_pending(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::TimedOut
            | std::io::ErrorKind::WouldBlock
            | std::io::ErrorKind::Interrupted
    )
}

fn reject(e: serialport::Error) -> ConfigError {
    ConfigError::Rejected(e.to_string())
}

fn data_bits(byte_size: u8) -> Option<serialport::DataBits> {
    match byte_size {
        5 => Some(serialport::DataBits::Five),
        6 => Some(serialport::DataBits::Six),
        7 => Some(serialport::DataBits::Seven),
        8 => Some(serialport::DataBits::Eight),
        _ => None,
    }
}

fn parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Odd => serialport::Parity::Odd,
        Parity::Even => serialport::Parity::Even,
    }
}

fn stop_bits(stop_bits: StopBits) -> serialport::StopBits {
    match stop_bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

/// The configured hardware flags are passed through, not negotiated:
/// either CTS-sensitive output or RTS handshaking selects hardware flow
/// control, anything else turns it off.
fn flow_control(cfg: &PortConfiguration) -> serialport::FlowControl {
    if cfg.cts_flow || cfg.rts_control == RtsControl::Handshake {
        serialport::FlowControl::Hardware
    } else {
        serialport::FlowControl::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_bits_accepts_five_through_eight() {
        assert_eq!(data_bits(5), Some(serialport::DataBits::Five));
        assert_eq!(data_bits(8), Some(serialport::DataBits::Eight));
        assert_eq!(data_bits(4), None);
        assert_eq!(data_bits(9), None);
    }

    #[test]
    fn flow_control_follows_configured_flags() {
        let mut cfg = PortConfiguration::default();
        assert_eq!(flow_control(&cfg), serialport::FlowControl::None);

        cfg.cts_flow = true;
        assert_eq!(flow_control(&cfg), serialport::FlowControl::Hardware);

        cfg.cts_flow = false;
        cfg.rts_control = RtsControl::Handshake;
        assert_eq!(flow_control(&cfg), serialport::FlowControl::Hardware);

        // A constantly-asserted RTS line is not handshaking
        cfg.rts_control = RtsControl::Enabled;
        assert_eq!(flow_control(&cfg), serialport::FlowControl::None);
    }

    #[test]
    fn pending_error_kinds_are_not_failures() {
        assert!(is_pending(&std::io::Error::from(std::io::ErrorKind::TimedOut)));
        assert!(is_pending(&std::io::Error::from(std::io::ErrorKind::WouldBlock)));
        assert!(!is_pending(&std::io::Error::from(std::io::ErrorKind::BrokenPipe)));
    }

    #[test]
    fn list_ports_does_not_panic() {
        // May return an empty list in CI
        assert!(SystemSerial::list_ports().is_ok());
    }
}
