//! Transport functionality
//!
//! The transport is the byte sink between the player and the instruments:
//! - [`Transport`] trait for writing one complete MIDI message
//! - [`SerialTransport`] for the real serial link (31250 baud, 8-N-1)
//! - [`MockTransport`] for testing

pub mod mock;
mod serial;

use crate::error::Result;
use std::time::Duration;

pub use mock::{MockTransport, RecordedWrite};
pub use serial::{SerialTransport, WriteTransport};

/// A byte-oriented sink that accepts whole MIDI messages.
pub trait Transport: Send {
    /// Writes `bytes` as a single contiguous write. A short write is an error.
    fn write_message(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Where and how to open the serial link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub device: String,
    pub baud_rate: u32,
    pub write_timeout: Duration,
}
