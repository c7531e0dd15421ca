//! Connection-oriented discipline.
//!
//! # Readiness (for beginners)
//!
//! The listener and every connected client are watched at once.  One call
//! to [`Discipline::next_request`] polls them in a fixed order:
//!
//! 1. client slots `0 .. watch_boundary`, lowest index first;
//! 2. the listener.
//!
//! The first ready handle wins the turn.  A ready client yields one frame;
//! a ready listener yields one accepted connection.  The *watch boundary* is
//! the highest occupied slot plus one and is recomputed on every accept and
//! every close, so free slots above it are never polled.
//!
//! A client that sends half a frame holds the turn until the rest arrives
//! or the client goes away.

use std::future::poll_fn;
use std::io;
use std::net::SocketAddr;
use std::task::{Context, Poll};

use async_trait::async_trait;
use fastevent_core::protocol::{decode_frame, ACK_FRAME, FRAME_WIDTH};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, error, info, warn};

use super::{Discipline, Incoming, Peer, ServiceError, TransportKind, CONN_MAX};

// ── Frame I/O ─────────────────────────────────────────────────────────────────

/// Result of reading one frame from a stream.
#[derive(Debug)]
pub enum FrameRead {
    /// Exactly [`FRAME_WIDTH`] bytes were received.
    Frame([u8; FRAME_WIDTH]),
    /// The peer closed the stream, possibly mid-frame.
    Closed,
    /// The stream failed.
    Error(io::Error),
}

/// Reads until one full frame has arrived or the stream ends.
pub async fn read_frame<R>(reader: &mut R) -> FrameRead
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut frame = [0u8; FRAME_WIDTH];
    let mut count = 0;
    while count < FRAME_WIDTH {
        match reader.read(&mut frame[count..]).await {
            Ok(0) => return FrameRead::Closed,
            Ok(n) => count += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return FrameRead::Error(e),
        }
    }
    FrameRead::Frame(frame)
}

/// Writes one acknowledgment frame.
pub async fn write_ack<W>(writer: &mut W) -> io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(&ACK_FRAME).await?;
    writer.flush().await
}

// ── Discipline ────────────────────────────────────────────────────────────────

enum Ready {
    Client(usize),
    Listener(io::Result<(TcpStream, SocketAddr)>),
}

/// TCP listener with a fixed table of [`CONN_MAX`] client slots.
pub struct TcpDiscipline {
    listener: Option<TcpListener>,
    clients: [Option<TcpStream>; CONN_MAX],
    watch: usize,
    verbose: bool,
}

impl TcpDiscipline {
    /// Binds `addr` with `SO_REUSEADDR` and starts listening with a backlog
    /// of [`CONN_MAX`].  Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Bind`] if any step fails.
    pub fn bind(addr: SocketAddr, verbose: bool) -> Result<Self, ServiceError> {
        let bind_err = |source| ServiceError::Bind { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(CONN_MAX as u32).map_err(bind_err)?;

        if verbose {
            info!("listening for TCP clients on {}", listener.local_addr().unwrap_or(addr));
        }
        Ok(Self {
            listener: Some(listener),
            clients: std::array::from_fn(|_| None),
            watch: 0,
            verbose,
        })
    }

    /// Number of occupied client slots.
    pub fn client_count(&self) -> usize {
        self.clients.iter().filter(|c| c.is_some()).count()
    }

    /// Highest occupied slot plus one.
    pub fn watch_boundary(&self) -> usize {
        self.watch
    }

    fn recompute_watch(&mut self) {
        self.watch = self
            .clients
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |slot| slot + 1);
    }

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Ready> {
        for (slot, client) in self.clients[..self.watch].iter().enumerate() {
            if let Some(stream) = client {
                // Peeking clears stale readiness left over from the previous
                // frame.  EOF and errors count as ready: the read reports them.
                let mut byte = [0u8; 1];
                let mut probe = ReadBuf::new(&mut byte);
                if stream.poll_peek(cx, &mut probe).is_ready() {
                    return Poll::Ready(Ready::Client(slot));
                }
            }
        }
        match &self.listener {
            Some(listener) => listener.poll_accept(cx).map(Ready::Listener),
            None => Poll::Pending,
        }
    }

    fn admit(&mut self, accepted: io::Result<(TcpStream, SocketAddr)>) {
        let (stream, addr) = match accepted {
            Ok(pair) => pair,
            Err(e) => {
                error!("accept() failed: {e}");
                return;
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            warn!("could not set TCP_NODELAY for {addr}: {e}");
        }

        match self.clients.iter().position(Option::is_none) {
            Some(slot) => {
                self.clients[slot] = Some(stream);
                self.recompute_watch();
                if self.verbose {
                    info!("accepted client {addr} in slot {slot}");
                }
            }
            None => {
                warn!("cannot accept {addr}: all {CONN_MAX} client slots are in use");
            }
        }
    }

    fn release(&mut self, slot: usize) {
        if self.clients[slot].take().is_some() {
            self.recompute_watch();
            if self.verbose {
                info!("client in slot {slot} disconnected");
            }
        }
    }

    async fn read_client(&mut self, slot: usize) -> Result<Incoming, ServiceError> {
        let Some(stream) = self.clients[slot].as_mut() else {
            return Ok(Incoming::Housekeeping);
        };

        match read_frame(stream).await {
            FrameRead::Frame(frame) => {
                let peer = Peer::Slot(slot);
                Ok(match decode_frame(&frame) {
                    Ok(request) => Incoming::Request { peer, request },
                    Err(error) => Incoming::Malformed { peer, error },
                })
            }
            FrameRead::Closed => {
                self.release(slot);
                Ok(Incoming::Housekeeping)
            }
            FrameRead::Error(e) => Err(ServiceError::Io(e)),
        }
    }
}

#[async_trait]
impl Discipline for TcpDiscipline {
    async fn next_request(&mut self) -> Result<Incoming, ServiceError> {
        if self.listener.is_none() {
            return Err(ServiceError::Closed);
        }

        match poll_fn(|cx| self.poll_ready(cx)).await {
            Ready::Client(slot) => self.read_client(slot).await,
            Ready::Listener(accepted) => {
                self.admit(accepted);
                Ok(Incoming::Housekeeping)
            }
        }
    }

    async fn acknowledge(&mut self, peer: Peer) {
        let Peer::Slot(slot) = peer else {
            debug!("ignoring acknowledgment for non-stream peer {peer:?}");
            return;
        };
        let Some(stream) = self.clients.get_mut(slot).and_then(Option::as_mut) else {
            return;
        };
        if let Err(e) = write_ack(stream).await {
            warn!("could not acknowledge client in slot {slot}: {e}");
            self.release(slot);
        }
    }

    async fn close(&mut self) {
        for client in self.clients.iter_mut() {
            client.take();
        }
        self.watch = 0;
        if self.listener.take().is_some() && self.verbose {
            info!("closed TCP listener");
        }
    }

    fn local_addr(&self) -> Result<SocketAddr, ServiceError> {
        let listener = self.listener.as_ref().ok_or(ServiceError::Closed)?;
        Ok(listener.local_addr()?)
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Tcp
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
