//! Network infrastructure: the service reactor and its transport disciplines.
//!
//! # Sub-modules
//!
//! - **`service`** – The [`Service`] reactor.  Owns one output driver and one
//!   discipline, loops until a shutdown request or a fatal fault, and then
//!   tears both down exactly once.
//!
//! - **`tcp`** – Connection-oriented discipline: a listener plus up to
//!   [`CONN_MAX`] client streams carrying 3-byte frames.
//!
//! - **`udp`** – Connectionless discipline: one socket, one command per
//!   datagram, optionally multiplexed.
//!
//! # How the pieces fit (for beginners)
//!
//! ```text
//!            ┌──────────── Service::run ─────────────┐
//!  sockets → │ Discipline::next_request → dispatch() │ → OutputDriver
//!            │ Discipline::acknowledge  ←  Outcome   │
//!            └───────────────────────────────────────┘
//! ```
//!
//! The service never touches a socket directly; everything transport
//! specific sits behind the [`Discipline`] trait.

use std::net::SocketAddr;

use async_trait::async_trait;
use fastevent_core::{ProtocolError, Request};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod service;
pub mod tcp;
pub mod udp;

pub use service::{Service, Termination};
pub use tcp::TcpDiscipline;
pub use udp::UdpDiscipline;

/// Maximum number of simultaneously connected TCP clients, also used as the
/// listen backlog.
pub const CONN_MAX: usize = 8;

/// Error type for the network layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The listening socket could not be created, bound or put in listen mode.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error on an established socket.
    #[error("network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The discipline was used after `close`.
    #[error("the service socket is already closed")]
    Closed,
}

/// Which transport discipline the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Tcp,
    Udp,
}

impl TransportKind {
    /// Whether an unrecognised command byte ends the service.
    ///
    /// A TCP client owns its stream and a stray byte is logged and
    /// acknowledged; on UDP it terminates the server.
    pub fn unrecognised_is_fatal(self) -> bool {
        matches!(self, TransportKind::Udp)
    }
}

/// Where an acknowledgment must be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peer {
    /// A connected TCP client, by slot index.
    Slot(usize),
    /// The sender of a UDP datagram.
    Addr(SocketAddr),
}

/// One unit of work produced by a discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incoming {
    /// A decoded command from `peer`.
    Request { peer: Peer, request: Request },
    /// Bytes from `peer` that could not be decoded at all.
    Malformed { peer: Peer, error: ProtocolError },
    /// A client connected or disconnected; nothing to dispatch.
    Housekeeping,
}

/// Transport strategy driven by [`Service`].
#[async_trait]
pub trait Discipline: Send {
    /// Waits, without timeout, for the next unit of work.
    ///
    /// # Errors
    ///
    /// Any error returned here is fatal to the service.
    async fn next_request(&mut self) -> Result<Incoming, ServiceError>;

    /// Sends the acknowledgment for the last request from `peer`.
    ///
    /// Failures are contained: a TCP client whose ack cannot be written is
    /// disconnected, a failed UDP reply is logged.
    async fn acknowledge(&mut self, peer: Peer);

    /// Closes every client and the listening socket.  Idempotent.
    async fn close(&mut self);

    /// Address the service socket is bound to.
    fn local_addr(&self) -> Result<SocketAddr, ServiceError>;

    fn kind(&self) -> TransportKind;
}
