//! Arduino-style serial output driver.
//!
//! Two board variants share one implementation and differ only in their
//! start-up handshake:
//!
//! | identifier | start-up                                                   |
//! |------------|------------------------------------------------------------|
//! | `leonardo` | send `CLEAR`                                               |
//! | `uno`      | wait `settle_ms` for the auto-reset, then read to `'\n'`   |
//!
//! # Options
//!
//! ```toml
//! [options]
//! port = "/dev/ttyACM0"   # required
//! baud = 230400           # optional
//! settle_ms = 3000        # optional, uno only
//! ```

use std::thread;
use std::time::Duration;

use fastevent_core::driver::{DriverError, DriverFactory, DriverOptions, OutputDriver};
use serde::Deserialize;
use tracing::{debug, info};

use super::link::{self, SerialLink};
use crate::infrastructure::transport::{ByteTransport, SerialPortTransport, DEFAULT_BAUD_RATE};

fn default_baud() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_settle_ms() -> u64 {
    3000
}

/// Options table accepted by the serial drivers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SerialOptions {
    /// Device path, e.g. `/dev/ttyACM0` or `COM3`.
    pub port: String,

    #[serde(default = "default_baud")]
    pub baud: u32,

    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl SerialOptions {
    /// Parses the driver's `options` table.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidOptions`] when `port` is missing or any
    /// field has the wrong type.
    pub fn parse(driver: &'static str, options: &DriverOptions) -> Result<Self, DriverError> {
        toml::Value::Table(options.clone())
            .try_into()
            .map_err(|e: toml::de::Error| DriverError::InvalidOptions {
                driver,
                reason: format!(
                    "{} (set the path to your board in the 'options.port' key)",
                    e.message()
                ),
            })
    }
}

/// Board variant, selecting the start-up handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    Leonardo,
    Uno,
}

impl Board {
    pub fn identifier(self) -> &'static str {
        match self {
            Board::Leonardo => "leonardo",
            Board::Uno => "uno",
        }
    }
}

/// Output driver writing channel changes to a serial microcontroller.
pub struct SerialOutputDriver<T: ByteTransport> {
    link: SerialLink<T>,
    board: Board,
    sync: bool,
    event: bool,
}

impl<T: ByteTransport> SerialOutputDriver<T> {
    /// Wraps `transport` and runs the board's start-up handshake.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Initialisation`] if the handshake fails.  The
    /// link has already been shut down in that case.
    pub fn start(transport: T, board: Board, settle: Duration) -> Result<Self, DriverError> {
        info!("initializing {} driver", board.identifier());
        let mut link = SerialLink::new(transport);

        let ready = match board {
            Board::Leonardo => link.clear(),
            Board::Uno => {
                thread::sleep(settle);
                link.wait_for_line()
            }
        };

        if !ready {
            return Err(DriverError::Initialisation {
                driver: board.identifier(),
                reason: "the device did not complete its start-up handshake".to_string(),
            });
        }

        Ok(Self {
            link,
            board,
            sync: false,
            event: false,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.link.is_closed()
    }

    pub fn link(&self) -> &SerialLink<T> {
        &self.link
    }
}

impl<T: ByteTransport> OutputDriver for SerialOutputDriver<T> {
    fn sync(&mut self, value: bool) {
        if self.sync != value {
            self.link
                .send(if value { link::SYNC_ON } else { link::SYNC_OFF });
            self.sync = value;
            debug!("sync->{value}");
        }
    }

    fn event(&mut self, value: bool) {
        if self.event != value {
            self.link
                .send(if value { link::EVENT_ON } else { link::EVENT_OFF });
            self.event = value;
            debug!("event->{value}");
        }
    }

    fn shutdown(&mut self) {
        if !self.link.is_closed() {
            info!("shutting down {} driver", self.board.identifier());
        }
        self.link.shutdown();
    }

    fn identifier(&self) -> &'static str {
        self.board.identifier()
    }
}

/// Registry factory opening a [`SerialPortTransport`] for one board variant.
#[derive(Debug, Clone, Copy)]
pub struct SerialFactory {
    board: Board,
}

impl SerialFactory {
    pub fn leonardo() -> Self {
        Self {
            board: Board::Leonardo,
        }
    }

    pub fn uno() -> Self {
        Self { board: Board::Uno }
    }
}

impl DriverFactory for SerialFactory {
    fn identifier(&self) -> &'static str {
        self.board.identifier()
    }

    fn setup(&self, options: &DriverOptions) -> Result<Box<dyn OutputDriver>, DriverError> {
        let driver = self.board.identifier();
        let opts = SerialOptions::parse(driver, options)?;
        info!("{driver}: port={} baud={}", opts.port, opts.baud);

        let transport = SerialPortTransport::open(&opts.port, opts.baud).map_err(|e| {
            DriverError::Unreachable {
                driver,
                path: opts.port.clone(),
                reason: e.to_string(),
            }
        })?;

        let output =
            SerialOutputDriver::start(transport, self.board, Duration::from_millis(opts.settle_ms))?;
        Ok(Box::new(output))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::transport::mock::MockTransport;

    fn leonardo() -> (SerialOutputDriver<MockTransport>, MockTransport) {
        let probe = MockTransport::new();
        let driver = SerialOutputDriver::start(probe.clone(), Board::Leonardo, Duration::ZERO)
            .expect("leonardo handshake only writes");
        probe.clear_written();
        (driver, probe)
    }

    fn options(entries: &[(&str, toml::Value)]) -> DriverOptions {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_leonardo_start_sends_clear() {
        let probe = MockTransport::new();

        let driver = SerialOutputDriver::start(probe.clone(), Board::Leonardo, Duration::ZERO);

        assert!(driver.is_ok());
        assert_eq!(probe.written(), b"O");
    }

    #[test]
    fn test_writes_only_on_change() {
        // Arrange
        let (mut driver, probe) = leonardo();

        // Act
        driver.sync(false);
        driver.sync(true);
        driver.sync(true);
        driver.event(false);
        driver.event(true);
        driver.event(true);

        // Assert
        assert_eq!(probe.written(), b"1A");
    }

    #[test]
    fn test_update_sends_one_byte_per_changed_channel() {
        let (mut driver, probe) = leonardo();

        driver.update(true, false);
        driver.update(true, true);

        assert_eq!(probe.written(), b"1A");
    }

    #[test]
    fn test_ack_failure_shuts_driver_down_and_silences_it() {
        // Arrange: no acknowledgment is ever queued
        let (mut driver, probe) = leonardo();

        // Act: the fourth change triggers the ack read
        driver.sync(true);
        driver.event(true);
        driver.sync(false);
        driver.event(false);
        let before = probe.written();
        driver.sync(true);
        driver.event(true);

        // Assert
        assert!(driver.is_closed());
        assert_eq!(before, b"1A2BO");
        assert_eq!(probe.written(), before);
    }

    #[test]
    fn test_shutdown_clears_and_closes_once() {
        let (mut driver, probe) = leonardo();

        driver.shutdown();
        driver.shutdown();

        assert_eq!(probe.written(), b"O");
        assert!(probe.is_closed());
    }

    #[test]
    fn test_uno_waits_for_ready_line() {
        // Arrange
        let probe = MockTransport::new();
        probe.inject_read(b"ok\n");

        // Act
        let driver = SerialOutputDriver::start(probe.clone(), Board::Uno, Duration::ZERO);

        // Assert
        assert!(driver.is_ok());
        assert_eq!(probe.reads(), 3);
        assert!(probe.written().is_empty());
    }

    #[test]
    fn test_uno_without_ready_line_fails_initialisation() {
        let probe = MockTransport::new();

        let result = SerialOutputDriver::start(probe.clone(), Board::Uno, Duration::ZERO);

        assert!(matches!(
            result,
            Err(DriverError::Initialisation { driver: "uno", .. })
        ));
        assert!(probe.is_closed());
    }

    #[test]
    fn test_leonardo_write_failure_fails_initialisation() {
        let probe = MockTransport::new();
        probe.fail_writes_after(0);

        let result = SerialOutputDriver::start(probe.clone(), Board::Leonardo, Duration::ZERO);

        assert!(matches!(
            result,
            Err(DriverError::Initialisation { driver: "leonardo", .. })
        ));
    }

    #[test]
    fn test_options_defaults() {
        let opts = SerialOptions::parse(
            "leonardo",
            &options(&[("port", toml::Value::String("/dev/ttyACM0".into()))]),
        )
        .unwrap();

        assert_eq!(opts.baud, 230_400);
        assert_eq!(opts.settle_ms, 3000);
    }

    #[test]
    fn test_options_missing_port_is_invalid() {
        let result = SerialOptions::parse("uno", &DriverOptions::new());

        match result {
            Err(DriverError::InvalidOptions { driver, reason }) => {
                assert_eq!(driver, "uno");
                assert!(reason.contains("options.port"));
            }
            other => panic!("expected InvalidOptions, got {other:?}"),
        }
    }

    #[test]
    fn test_options_wrong_type_is_invalid() {
        let result = SerialOptions::parse(
            "leonardo",
            &options(&[("port", toml::Value::Integer(3))]),
        );
        assert!(matches!(result, Err(DriverError::InvalidOptions { .. })));
    }

    #[test]
    fn test_factory_reports_unreachable_device() {
        let opts = options(&[(
            "port",
            toml::Value::String("/nonexistent/fastevent-tty".into()),
        )]);

        let result = SerialFactory::leonardo().setup(&opts);

        match result {
            Err(DriverError::Unreachable { driver, path, .. }) => {
                assert_eq!(driver, "leonardo");
                assert_eq!(path, "/nonexistent/fastevent-tty");
            }
            Err(other) => panic!("expected Unreachable, got {other}"),
            Ok(_) => panic!("expected Unreachable, got a driver"),
        }
    }

    #[test]
    fn test_factory_identifiers() {
        assert_eq!(SerialFactory::leonardo().identifier(), "leonardo");
        assert_eq!(SerialFactory::uno().identifier(), "uno");
    }
}
