//! Name → factory registry for output drivers.
//!
//! The registry is an ordinary value, built once at process start and handed
//! to the service by reference.  Every compiled-in driver type registers
//! itself before the service is configured; nothing is registered afterwards.
//!
//! ```rust
//! use fastevent_core::driver::{DriverOptions, DriverRegistry, DummyFactory};
//!
//! let mut registry = DriverRegistry::new();
//! registry.register(DummyFactory);
//!
//! let driver = registry.resolve("dummy", &DriverOptions::new(), false).unwrap();
//! assert_eq!(driver.identifier(), "dummy");
//! ```

use std::collections::BTreeMap;

use tracing::info;

use super::{DriverError, DriverFactory, DriverOptions, OutputDriver};

/// Mapping from driver identifier to the factory that builds it.
///
/// A `BTreeMap` keeps the verbose listing in a stable, sorted order.
#[derive(Default)]
pub struct DriverRegistry {
    factories: BTreeMap<String, Box<dyn DriverFactory>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under its own identifier.
    ///
    /// An existing entry with the same identifier is replaced and returned.
    pub fn register<F>(&mut self, factory: F) -> Option<Box<dyn DriverFactory>>
    where
        F: DriverFactory + 'static,
    {
        let identifier = factory.identifier().to_string();
        self.factories.insert(identifier, Box::new(factory))
    }

    /// Looks up `identifier` and runs its factory with `options`.
    ///
    /// When `verbose` is set the full list of known identifiers is logged
    /// first; this does not affect the result.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotFound`] for an unknown identifier, or
    /// whatever error the factory itself reports.
    pub fn resolve(
        &self,
        identifier: &str,
        options: &DriverOptions,
        verbose: bool,
    ) -> Result<Box<dyn OutputDriver>, DriverError> {
        if verbose {
            info!(
                "registered output drivers: [{}]",
                self.identifiers().collect::<Vec<_>>().join(", ")
            );
        }

        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| DriverError::NotFound(identifier.to_string()))?;

        if verbose {
            info!("found output driver: {identifier}");
        }
        factory.setup(options)
    }

    /// Iterates over registered identifiers in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
