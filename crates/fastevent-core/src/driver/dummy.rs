//! No-op output driver.
//!
//! `DummyDriver` logs every command and talks to no hardware.  It is
//! registered as `dummy` for testing setups and is also the fallback the
//! service substitutes when the configured driver cannot be built.

use tracing::{debug, info};

use super::{DriverError, DriverFactory, DriverOptions, OutputDriver};

/// Identifier the dummy driver is registered under.
pub const IDENTIFIER: &str = "dummy";

/// An output driver that only logs.
#[derive(Debug, Default)]
pub struct DummyDriver {
    closed: bool,
}

impl DummyDriver {
    pub fn new() -> Self {
        info!("initializing DummyDriver");
        Self::default()
    }

    /// Builds a dummy driver; `options` are accepted and ignored so the
    /// fallback path can reuse whatever the failed driver was given.
    pub fn setup(_options: &DriverOptions) -> Self {
        Self::new()
    }
}

impl OutputDriver for DummyDriver {
    fn sync(&mut self, value: bool) {
        debug!("sync->{value}");
    }

    fn event(&mut self, value: bool) {
        debug!("event->{value}");
    }

    fn shutdown(&mut self) {
        if !self.closed {
            info!("shutting down DummyDriver");
            self.closed = true;
        }
    }

    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }
}

/// Registry factory for [`DummyDriver`].  Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyFactory;

impl DriverFactory for DummyFactory {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn setup(&self, options: &DriverOptions) -> Result<Box<dyn OutputDriver>, DriverError> {
        Ok(Box::new(DummyDriver::setup(options)))
    }
}
