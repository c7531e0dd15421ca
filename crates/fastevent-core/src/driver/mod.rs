//! Output driver abstraction.
//!
//! An *output driver* turns the two logical channels of the protocol (`sync`
//! and `event`) into something physical: pin levels on a microcontroller, a
//! log line, a recorded call in a test.  The server never knows which backend
//! it is talking to; it only sees a `Box<dyn OutputDriver>`.
//!
//! # Lifecycle
//!
//! ```text
//! DriverRegistry::resolve(name, options)
//!   └─ DriverFactory::setup(options)   -- the only fallible step
//!        └─ Box<dyn OutputDriver>
//!             ├─ sync / event / update  (any number of times)
//!             └─ shutdown               (idempotent)
//! ```
//!
//! Drivers are constructed by a [`DriverFactory`] registered in a
//! [`DriverRegistry`].  Once constructed, a driver never reports errors to its
//! caller: a backend fault shuts the driver down and later calls are logged
//! and ignored, so a broken device cannot take the server down with it.

use thiserror::Error;

pub mod dummy;
pub mod mock;
pub mod registry;

pub use dummy::{DummyDriver, DummyFactory};
pub use registry::DriverRegistry;

/// Driver-specific configuration, passed verbatim from the `options` table
/// of the service configuration.
pub type DriverOptions = toml::Table;

/// Error type for driver construction and lookup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriverError {
    /// No factory is registered under the requested identifier.
    #[error("could not find the output driver with name '{0}'")]
    NotFound(String),

    /// The `options` table is missing a field or has a field of the wrong type.
    #[error("{driver}: invalid options: {reason}")]
    InvalidOptions {
        driver: &'static str,
        reason: String,
    },

    /// The backend device could not be opened.
    #[error("{driver}: could not open device at {path}: {reason}")]
    Unreachable {
        driver: &'static str,
        path: String,
        reason: String,
    },

    /// The device opened but failed during its start-up handshake.
    #[error("{driver}: initialisation failed: {reason}")]
    Initialisation {
        driver: &'static str,
        reason: String,
    },
}

/// Capability contract shared by every output backend.
///
/// Implementations keep the last commanded value of each channel and only
/// talk to their backend when a requested value differs from it.
pub trait OutputDriver: Send {
    /// Sets the sync channel.
    fn sync(&mut self, value: bool);

    /// Sets the event channel.
    fn event(&mut self, value: bool);

    /// Sets both channels.
    ///
    /// The default applies `sync` then `event`.  Backends that can change
    /// both channels in one transaction override this.
    fn update(&mut self, sync: bool, event: bool) {
        self.sync(sync);
        self.event(event);
    }

    /// Releases the backend.  Calling it again must be a no-op.
    fn shutdown(&mut self);

    /// Stable name of the backend, for logs and diagnostics.
    fn identifier(&self) -> &'static str;
}

/// Constructs one kind of [`OutputDriver`] from its options.
pub trait DriverFactory: Send + Sync {
    /// Unique, stable identifier the driver is registered under.
    fn identifier(&self) -> &'static str;

    /// Builds a live driver.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the options are malformed or the backend
    /// cannot be reached.
    fn setup(&self, options: &DriverOptions) -> Result<Box<dyn OutputDriver>, DriverError>;
}
