//! Recording output driver for tests.
//!
//! The real drivers talk to hardware that a test cannot observe.
//! `MockOutputDriver` instead appends every call it receives to a shared
//! [`CallLog`].  The log handle stays with the test after the driver itself
//! has been moved into a service, so assertions can be made on exactly which
//! calls arrived and in what order.
//!
//! # Usage in tests
//!
//! ```rust
//! use fastevent_core::driver::mock::{DriverCall, MockOutputDriver};
//! use fastevent_core::driver::OutputDriver;
//!
//! let driver = MockOutputDriver::new();
//! let calls = driver.calls();
//!
//! let mut boxed: Box<dyn OutputDriver> = Box::new(driver);
//! boxed.update(true, true);
//!
//! assert_eq!(calls.snapshot(), vec![DriverCall::Update { sync: true, event: true }]);
//! ```
//!
//! Unlike the real drivers the mock records *every* call, repeated values
//! included, and overrides `update` so a dual-channel update shows up as one
//! entry rather than two.

use std::sync::{Arc, Mutex, PoisonError};

use super::OutputDriver;

/// Identifier reported by [`MockOutputDriver`].
pub const IDENTIFIER: &str = "mock";

/// One call received by a [`MockOutputDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    Sync(bool),
    Event(bool),
    Update { sync: bool, event: bool },
    Shutdown,
}

/// Shared, cloneable view of the calls a mock driver has received.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    inner: Arc<Mutex<Vec<DriverCall>>>,
}

impl CallLog {
    fn push(&self, call: DriverCall) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Returns a copy of every call recorded so far.
    pub fn snapshot(&self) -> Vec<DriverCall> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `shutdown` calls that reached the driver while it was open.
    pub fn shutdown_count(&self) -> usize {
        self.snapshot()
            .iter()
            .filter(|call| matches!(call, DriverCall::Shutdown))
            .count()
    }
}

/// An [`OutputDriver`] that records calls instead of performing them.
#[derive(Debug, Default)]
pub struct MockOutputDriver {
    calls: CallLog,
    closed: bool,
}

impl MockOutputDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver that records into an existing log, for factories
    /// that build the driver after the test has taken its handle.
    pub fn with_log(calls: CallLog) -> Self {
        Self {
            calls,
            closed: false,
        }
    }

    /// Returns a handle to this driver's call log.
    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }
}

impl OutputDriver for MockOutputDriver {
    fn sync(&mut self, value: bool) {
        self.calls.push(DriverCall::Sync(value));
    }

    fn event(&mut self, value: bool) {
        self.calls.push(DriverCall::Event(value));
    }

    fn update(&mut self, sync: bool, event: bool) {
        self.calls.push(DriverCall::Update { sync, event });
    }

    fn shutdown(&mut self) {
        if !self.closed {
            self.closed = true;
            self.calls.push(DriverCall::Shutdown);
        }
    }

    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }
}
