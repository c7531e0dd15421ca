//! # fastevent-core
//!
//! Shared library for the FastEvent trigger server containing the wire
//! command set and its codec, the output driver abstraction with its
//! registry, and small domain utilities.
//!
//! It has zero dependencies on OS APIs, sockets, or serial ports.
//!
//! # Architecture overview (for beginners)
//!
//! FastEvent synchronises external hardware (an experiment marker, a laser
//! gate, a camera trigger) with commands arriving over the network.  A client
//! sends a single command byte such as `'A'` ("event on"); the server sets
//! the corresponding output channel on a microcontroller and acknowledges.
//!
//! This crate (`fastevent-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – The command bytes and how they are framed on a TCP
//!   stream (3-byte frames) or in a UDP datagram (first byte, optionally
//!   multiplexed).
//!
//! - **`driver`** – The [`OutputDriver`] trait every hardware backend
//!   implements, the [`DriverRegistry`] that maps configured names to driver
//!   factories, and the no-op [`DummyDriver`] used as a safe fallback.
//!
//! - **`domain`** – The overflow-bounded [`RunningAverage`] used for latency
//!   reporting.

pub mod domain;
pub mod driver;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `fastevent_core::Request` instead of `fastevent_core::protocol::commands::Request`.
pub use domain::averager::RunningAverage;
pub use driver::{
    DriverError, DriverFactory, DriverOptions, DriverRegistry, DummyDriver, DummyFactory,
    OutputDriver,
};
pub use protocol::codec::{decode_datagram, decode_frame, ProtocolError};
pub use protocol::commands::Request;
