//! Hardware output drivers.
//!
//! The OS-free drivers (`dummy`, the test mock) live in `fastevent-core`;
//! this module adds the ones that need a device handle.

pub mod link;
pub mod serial;

use fastevent_core::driver::{DriverRegistry, DummyFactory};

pub use serial::{Board, SerialFactory, SerialOptions, SerialOutputDriver};

/// Registers every driver compiled into this binary.
pub fn register_builtin_drivers(registry: &mut DriverRegistry) {
    registry.register(DummyFactory);
    registry.register(SerialFactory::leonardo());
    registry.register(SerialFactory::uno());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_drivers_registered() {
        let mut registry = DriverRegistry::new();

        register_builtin_drivers(&mut registry);

        let names: Vec<_> = registry.identifiers().collect();
        assert_eq!(names, vec!["dummy", "leonardo", "uno"]);
    }
}
