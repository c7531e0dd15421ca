//! Byte transports for output devices.
//!
//! Drivers never touch a serial handle directly; they go through the
//! [`ByteTransport`] trait, one byte at a time.  Production code uses
//! [`SerialPortTransport`]; tests use [`mock::MockTransport`].
//!
//! # Why one byte at a time?
//!
//! The device protocol is made of single-byte commands and single-byte
//! acknowledgments.  Exposing exactly that keeps the driver's flow-control
//! logic easy to follow and easy to script in tests.

use thiserror::Error;

pub mod mock;
mod serial;

pub use serial::{SerialPortTransport, DEFAULT_BAUD_RATE};

/// Error type for byte transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The device path could not be opened or configured.
    #[error("failed to open serial port at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },

    /// The device reported end-of-stream, or the transport was already closed.
    #[error("device closed")]
    Closed,

    /// Any other I/O failure on an open handle.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A blocking, byte-oriented link to an output device.
pub trait ByteTransport: Send {
    /// Blocks until one byte arrives.
    fn read_byte(&mut self) -> Result<u8, TransportError>;

    /// Blocks until `byte` has been handed to the device.
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError>;

    /// Releases the handle.  Later reads and writes fail with
    /// [`TransportError::Closed`].
    fn close(&mut self);
}
