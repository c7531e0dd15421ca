//! Application layer use cases for the trigger server.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules, here in `fastevent-core`) and the infrastructure
//! (sockets, serial ports, files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil one request.
//! - **Depend on abstractions** (the `OutputDriver` trait) rather than
//!   concrete backends.
//! - **Contain no OS calls, no network I/O, no file system access**.
//!
//! # Sub-modules
//!
//! - **`dispatch`** – Applies one decoded [`Request`](fastevent_core::Request)
//!   to the output driver and tells the network layer what to do next.  It
//!   runs once per received command, on the latency-critical path.

pub mod dispatch;
