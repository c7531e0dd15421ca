//! Connectionless discipline.
//!
//! Every datagram is one command; the reply is a single `Y` sent back to the
//! datagram's source address.  Only the first [`MAX_DATAGRAM_SIZE`] bytes
//! of a datagram are read and only the first byte is interpreted.

use std::net::SocketAddr;

use async_trait::async_trait;
use fastevent_core::protocol::{decode_datagram, ACK_DATAGRAM, MAX_DATAGRAM_SIZE};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use super::{Discipline, Incoming, Peer, ServiceError, TransportKind};

/// A single bound UDP socket.
pub struct UdpDiscipline {
    socket: Option<UdpSocket>,
    buf: [u8; MAX_DATAGRAM_SIZE],
    verbose: bool,
}

impl UdpDiscipline {
    /// Binds `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Bind`] if the socket cannot be bound.
    pub async fn bind(addr: SocketAddr, verbose: bool) -> Result<Self, ServiceError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| ServiceError::Bind { addr, source })?;

        if verbose {
            info!("listening for UDP datagrams on {}", socket.local_addr().unwrap_or(addr));
        }
        Ok(Self {
            socket: Some(socket),
            buf: [0u8; MAX_DATAGRAM_SIZE],
            verbose,
        })
    }
}

#[async_trait]
impl Discipline for UdpDiscipline {
    async fn next_request(&mut self) -> Result<Incoming, ServiceError> {
        let socket = self.socket.as_ref().ok_or(ServiceError::Closed)?;
        let (len, addr) = socket.recv_from(&mut self.buf).await?;

        let peer = Peer::Addr(addr);
        Ok(match decode_datagram(&self.buf[..len]) {
            Ok(request) => Incoming::Request { peer, request },
            Err(error) => Incoming::Malformed { peer, error },
        })
    }

    async fn acknowledge(&mut self, peer: Peer) {
        let Peer::Addr(addr) = peer else {
            debug!("ignoring acknowledgment for non-datagram peer {peer:?}");
            return;
        };
        let Some(socket) = self.socket.as_ref() else {
            return;
        };
        if let Err(e) = socket.send_to(&ACK_DATAGRAM, addr).await {
            warn!("could not acknowledge datagram from {addr}: {e}");
        }
    }

    async fn close(&mut self) {
        if self.socket.take().is_some() && self.verbose {
            info!("closed UDP socket");
        }
    }

    fn local_addr(&self) -> Result<SocketAddr, ServiceError> {
        let socket = self.socket.as_ref().ok_or(ServiceError::Closed)?;
        Ok(socket.local_addr()?)
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Udp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastevent_core::{ProtocolError, Request};
    use std::net::{Ipv4Addr, SocketAddrV4};

    fn loopback() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
    }

    async fn pair() -> (UdpDiscipline, UdpSocket) {
        let discipline = UdpDiscipline::bind(loopback(), false).await.unwrap();
        let client = UdpSocket::bind(loopback()).await.unwrap();
        client.connect(discipline.local_addr().unwrap()).await.unwrap();
        (discipline, client)
    }

    #[tokio::test]
    async fn test_multiplexed_datagram_decodes_to_update() {
        // Arrange
        let (mut discipline, client) = pair().await;

        // Act
        client.send(&[0x31 | 0x41]).await.unwrap();
        let incoming = discipline.next_request().await.unwrap();

        // Assert
        assert_eq!(
            incoming,
            Incoming::Request {
                peer: Peer::Addr(client.local_addr().unwrap()),
                request: Request::Update {
                    sync: true,
                    event: true
                }
            }
        );
    }

    #[tokio::test]
    async fn test_trailing_bytes_are_ignored() {
        let (mut discipline, client) = pair().await;

        client.send(b"2 and then some").await.unwrap();
        let incoming = discipline.next_request().await.unwrap();

        assert!(matches!(
            incoming,
            Incoming::Request {
                request: Request::Sync(false),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_datagram_is_malformed() {
        let (mut discipline, client) = pair().await;

        client.send(&[]).await.unwrap();
        let incoming = discipline.next_request().await.unwrap();

        assert!(matches!(
            incoming,
            Incoming::Malformed {
                error: ProtocolError::EmptyDatagram,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_acknowledge_replies_to_sender() {
        // Arrange
        let (mut discipline, client) = pair().await;
        client.send(b"A").await.unwrap();
        let Incoming::Request { peer, .. } = discipline.next_request().await.unwrap() else {
            panic!("expected a request");
        };

        // Act
        discipline.acknowledge(peer).await;

        // Assert
        let mut reply = [0u8; 4];
        let n = client.recv(&mut reply).await.unwrap();
        assert_eq!(&reply[..n], b"Y");
    }

    #[tokio::test]
    async fn test_closed_socket_rejects_requests() {
        let (mut discipline, _client) = pair().await;

        discipline.close().await;

        assert!(matches!(discipline.next_request().await, Err(ServiceError::Closed)));
    }
}
