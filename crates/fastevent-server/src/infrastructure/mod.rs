//! Infrastructure layer for the trigger server.
//!
//! Contains OS-facing adapters: network sockets, serial output drivers and
//! their byte transports, and configuration file loading.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `fastevent_core`, but MUST NOT be imported by the `application` layer.

pub mod drivers;
pub mod network;
pub mod storage;
pub mod transport;
