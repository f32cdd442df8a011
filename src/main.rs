//! Minimal console front-end
//!
//! Presentation glue only; the engine lives in the library. Lines typed
//! on stdin are transmitted one character at a time (plus a carriage
//! return, as a terminal would send), received bytes stream to stdout,
//! and session notifications go to stderr.
//!
//! Usage:
//!   cargo run -- <port> [baud_rate]
//!   MOCK_SERIAL=1 cargo run -- COM1        (loopback, no hardware needed)

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use dumbterm::adapters::mock_serial::MockSerialLink;
use dumbterm::adapters::serial_port::SystemSerial;
use dumbterm::domain::{PortConfiguration, SessionEvent};
use dumbterm::ports::{ByteSink, SerialOpen};
use dumbterm::session::SessionController;

struct StdoutSink;

impl ByteSink for StdoutSink {
    fn deliver(&self, bytes: &[u8]) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(bytes);
        let _ = out.flush();
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let (port, baud_rate) = match args.len() {
        3 => (args[1].clone(), args[2].parse().unwrap_or(9600)),
        2 => (args[1].clone(), 9600),
        _ => {
            println!("Usage: dumbterm <port> [baud_rate]");
            println!("\nAvailable ports:");
            match SystemSerial::list_ports() {
                Ok(ports) => {
                    for p in ports {
                        println!("  {} ({})", p.name, p.port_type);
                    }
                }
                Err(e) => eprintln!("  could not list ports: {e}"),
            }
            return;
        }
    };

    let opener: Box<dyn SerialOpen> = if std::env::var("MOCK_SERIAL").is_ok() {
        let mock = MockSerialLink::new();
        mock.set_loopback(true);
        Box::new(mock)
    } else {
        Box::new(SystemSerial)
    };

    let mut config = PortConfiguration::for_port(&port);
    config.baud_rate = baud_rate;

    let mut session = SessionController::with_configuration(opener, Arc::new(StdoutSink), config);
    if let Err(e) = session.connect() {
        eprintln!("connect failed: {e}");
        std::process::exit(1);
    }
    eprintln!("Connected to {port} at {baud_rate} baud. Type to send, Ctrl+D to exit.");

    let stdin = io::stdin();
    'input: for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        for byte in line.bytes().chain(std::iter::once(b'\r')) {
            if let Err(e) = session.send(byte) {
                eprintln!("send failed: {e}");
            }
        }

        // All user-visible notification happens here in the foreground;
        // the receive worker only posts onto the channel.
        while let Ok(event) = session.events().try_recv() {
            match event {
                SessionEvent::ReceiveFailed { reason } => {
                    eprintln!("receive error: {reason}");
                    break 'input;
                }
                SessionEvent::Connected { .. }
                | SessionEvent::Disconnected
                | SessionEvent::ReceiverStopped => {}
            }
        }
    }

    session.disconnect();
}
