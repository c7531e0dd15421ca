//! `serialport`-backed byte transport.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{info, warn};

use super::{ByteTransport, TransportError};

/// Baud rate the bundled firmware runs at.
pub const DEFAULT_BAUD_RATE: u32 = 230_400;

/// Short poll interval so a blocked read can still notice a closed handle.
const POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// A serial device opened 8N1 with no flow control.
pub struct SerialPortTransport {
    port: Option<Box<dyn SerialPort>>,
    path: String,
}

impl SerialPortTransport {
    /// Opens the device at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Open`] if the device does not exist or
    /// cannot be configured.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(POLL_TIMEOUT)
            .open()
            .map_err(|source| TransportError::Open {
                path: path.to_string(),
                source,
            })?;

        info!("opened serial port {path} at {baud_rate} baud");
        Ok(Self {
            port: Some(port),
            path: path.to_string(),
        })
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, TransportError> {
        self.port.as_mut().ok_or(TransportError::Closed)
    }
}

impl ByteTransport for SerialPortTransport {
    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let port = self.port()?;
        let mut buf = [0u8; 1];
        loop {
            match port.read(&mut buf) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => return Ok(buf[0]),
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        let port = self.port()?;
        let mut warned = false;
        loop {
            match port.write(&[byte]) {
                Ok(1) => return Ok(()),
                Ok(_) => {}
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) => {}
                Err(e) => return Err(e.into()),
            }
            if !warned {
                warn!("write buffer is full on the serial port");
                warned = true;
            }
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!("closed serial port {}", self.path);
        }
    }
}
