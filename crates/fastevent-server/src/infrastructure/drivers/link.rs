//! Stop-and-wait command link to a serial microcontroller.
//!
//! `SerialLink` owns a [`ByteTransport`] and knows the device-side command
//! bytes, but nothing about channels or board variants.  The output driver
//! composes it and decides *which* byte to send; the link decides *how*.
//!
//! # Flow control (for beginners)
//!
//! The firmware answers every fourth command with a single byte.  Waiting
//! for that byte keeps the host from racing ahead of a device whose receive
//! buffer is tiny:
//!
//! ```text
//! host:   '1'  'A'  '2'  'B'  ─wait─  '1'  ...
//! device:                     'K'
//! ```
//!
//! `CLEAR` bytes sent at start-up and shutdown are outside this window.
//!
//! Any transport failure shuts the link down; a closed link logs and drops
//! every later command.

#[cfg(feature = "latency-profile")]
use std::time::Instant;

#[cfg(feature = "latency-profile")]
use fastevent_core::RunningAverage;
use tracing::{error, info, warn};

use crate::infrastructure::transport::{ByteTransport, TransportError};

// ── Device command bytes ──────────────────────────────────────────────────────

pub const SYNC_ON: u8 = b'1';
pub const SYNC_OFF: u8 = b'2';
pub const EVENT_ON: u8 = b'A';
pub const EVENT_OFF: u8 = b'B';
/// Reserved by the firmware; never sent by this server.
pub const FLUSH: u8 = b'F';
/// Drives both outputs low.
pub const CLEAR: u8 = b'O';
/// Terminates the readiness banner a freshly reset board prints.
pub const LINE_END: u8 = b'\n';

/// Number of command bytes between acknowledgment reads.
pub const FLOW_CONTROL_WINDOW: u32 = 4;

/// A flow-controlled serial command link.
pub struct SerialLink<T: ByteTransport> {
    transport: T,
    counter: u32,
    closed: bool,
    #[cfg(feature = "latency-profile")]
    latency: RunningAverage,
}

impl<T: ByteTransport> SerialLink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            counter: 0,
            closed: false,
            #[cfg(feature = "latency-profile")]
            latency: RunningAverage::default(),
        }
    }

    /// Sends one command byte, reading the acknowledgment when the flow
    /// control window is full.
    ///
    /// Returns `false` if the link was already closed or has just been shut
    /// down because of a transport failure.
    pub fn send(&mut self, command: u8) -> bool {
        if self.closed {
            warn!("serial port already closed; dropping command '{}'", command as char);
            return false;
        }

        #[cfg(feature = "latency-profile")]
        let started = Instant::now();

        if let Err(e) = self.transport.write_byte(command) {
            error!("error sending serial command: {e}");
            self.shutdown();
            return false;
        }

        self.counter += 1;
        if self.counter < FLOW_CONTROL_WINDOW {
            return true;
        }
        self.counter = 0;

        match self.transport.read_byte() {
            Ok(_) => {
                #[cfg(feature = "latency-profile")]
                self.latency
                    .add(u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX));
                true
            }
            Err(e) => {
                if !matches!(e, TransportError::Closed) {
                    error!("error receiving the response: {e}");
                }
                self.shutdown();
                false
            }
        }
    }

    /// Sends `CLEAR` outside the flow-control window.
    pub fn clear(&mut self) -> bool {
        if self.closed {
            return false;
        }
        match self.transport.write_byte(CLEAR) {
            Ok(()) => true,
            Err(e) => {
                error!("error sending serial command: {e}");
                self.shutdown();
                false
            }
        }
    }

    /// Discards incoming bytes up to and including the next [`LINE_END`].
    pub fn wait_for_line(&mut self) -> bool {
        loop {
            if self.closed {
                return false;
            }
            match self.transport.read_byte() {
                Ok(LINE_END) => {
                    info!("serial device is ready");
                    return true;
                }
                Ok(_) => {}
                Err(e) => {
                    if !matches!(e, TransportError::Closed) {
                        error!("error receiving the response: {e}");
                    }
                    self.shutdown();
                    return false;
                }
            }
        }
    }

    /// Clears the outputs, closes the transport and reports latency.
    /// Later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.transport.write_byte(CLEAR) {
            warn!("could not clear outputs before closing: {e}");
        }
        self.transport.close();
        self.report_latency();
    }

    #[cfg(feature = "latency-profile")]
    fn report_latency(&self) {
        match self.latency.mean() {
            Some(mean) => info!(
                "average response latency: {:.3} usec/transaction ({} transactions)",
                mean / 1000.0,
                self.latency.count()
            ),
            None => info!("average response latency: no transaction was measured"),
        }
    }

    #[cfg(not(feature = "latency-profile"))]
    fn report_latency(&self) {}

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[cfg(feature = "latency-profile")]
    pub fn latency(&self) -> &RunningAverage {
        &self.latency
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
