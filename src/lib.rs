//! Dumb-terminal serial link
//!
//! Point-to-point byte stream to a serial device: characters go out one at
//! a time as they are typed, bytes from the device are delivered to a sink
//! as they arrive. A background worker drives the receive side with a
//! bounded wait per read, so a disconnect request is always observed
//! within one timeout interval.
//!
//! ## Architecture (Hexagonal / Ports & Adapters)
//!
//! - `domain/` - Pure domain types, no I/O dependencies
//! - `ports/` - Trait definitions (interfaces) for external dependencies
//! - `adapters/` - Implementations of ports (serialport crate, mock device)
//! - `session/` - Connection lifecycle, receive loop, transmit path
//! - `profiles` - Saved port configurations as JSON files
//!
//! The presentation layer — windows, menus, configuration dialogs, text
//! rendering — is an external collaborator. It talks to the engine through
//! [`session::SessionController`], a [`ports::ByteSink`], and the session
//! event channel; a minimal console front-end ships in `src/main.rs`.

// Core domain (pure, no I/O)
pub mod domain;
pub mod ports;

// Adapters (external I/O)
pub mod adapters;

// Session engine
pub mod session;

// Saved configurations
pub mod profiles;
