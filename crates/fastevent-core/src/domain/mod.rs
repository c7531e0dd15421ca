//! Domain utilities for FastEvent.
//!
//! Pure logic with no infrastructure dependencies: nothing in here touches a
//! socket, a serial port, or the clock.

/// Overflow-bounded running mean used for latency reporting.
pub mod averager;
