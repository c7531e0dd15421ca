//! Dispatch use case: apply one decoded request to the output driver.
//!
//! The network disciplines decode bytes into a [`Request`], hand it to
//! [`dispatch`], and act on the returned [`Outcome`]:
//!
//! | request            | driver call            | outcome          |
//! |--------------------|------------------------|------------------|
//! | `Sync(v)`          | `sync(v)`              | `Acknowledge`    |
//! | `Event(v)`         | `event(v)`             | `Acknowledge`    |
//! | `Update{s, e}`     | `update(s, e)`         | `Acknowledge`    |
//! | `Noop`             | none                   | `Acknowledge`    |
//! | `Shutdown`         | none                   | `Shutdown`       |
//! | `Unknown(b)`       | none                   | `Unrecognised(b)`|
//!
//! What happens after an `Unrecognised` outcome is transport policy and
//! lives in the network layer.

use fastevent_core::{OutputDriver, Request};

/// What the caller should do after a request has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Acknowledge and keep serving.
    Acknowledge,
    /// Acknowledge, then terminate the service.
    Shutdown,
    /// The command byte means nothing to this server.
    Unrecognised(u8),
}

/// Applies `request` to `driver`.
pub fn dispatch(driver: &mut dyn OutputDriver, request: Request) -> Outcome {
    match request {
        Request::Sync(value) => driver.sync(value),
        Request::Event(value) => driver.event(value),
        Request::Update { sync, event } => driver.update(sync, event),
        Request::Noop => {}
        Request::Shutdown => return Outcome::Shutdown,
        Request::Unknown(byte) => return Outcome::Unrecognised(byte),
    }
    Outcome::Acknowledge
}

// ── Tests ─────────────────────────────────────────────────────────────────────
