//! Integration tests for the UDP service over real loopback sockets.
//!
//! Each test sends datagrams from an ordinary `UdpSocket` and reads the
//! one-byte `Y` replies, checking what reached the output driver.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use fastevent_core::driver::mock::{CallLog, DriverCall, MockOutputDriver};
use fastevent_core::protocol::commands::multiplex;
use fastevent_core::ProtocolError;
use fastevent_server::infrastructure::network::{Discipline, Service, Termination, UdpDiscipline};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

fn loopback() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
}

async fn start_server() -> (UdpSocket, CallLog, JoinHandle<Termination>) {
    let discipline = UdpDiscipline::bind(loopback(), false)
        .await
        .expect("bind loopback");
    let addr = discipline.local_addr().expect("local addr");
    let driver = MockOutputDriver::new();
    let calls = driver.calls();
    let service = Service::new(Box::new(discipline), Box::new(driver), false);
    let server = tokio::spawn(service.run());

    let client = UdpSocket::bind(loopback()).await.expect("client socket");
    client.connect(addr).await.expect("connect client");
    (client, calls, server)
}

async fn exchange(client: &UdpSocket, datagram: &[u8]) -> Vec<u8> {
    client.send(datagram).await.expect("send datagram");
    let mut reply = [0u8; 8];
    let n = client.recv(&mut reply).await.expect("receive reply");
    reply[..n].to_vec()
}

#[tokio::test]
async fn test_multiplexed_datagram_is_one_update_and_one_ack() {
    // Arrange
    let (client, calls, _server) = start_server().await;

    // Act
    let reply = exchange(&client, &[0x31 | 0x41]).await;

    // Assert
    assert_eq!(reply, b"Y");
    assert_eq!(
        calls.snapshot(),
        vec![DriverCall::Update {
            sync: true,
            event: true
        }]
    );
}

#[tokio::test]
async fn test_single_commands_and_line_endings() {
    let (client, calls, _server) = start_server().await;

    let both_off = [multiplex(false, false)];
    let datagrams: [&[u8]; 5] = [b"A", b"\r", b"\n", b"2\r\n", &both_off];
    for datagram in datagrams {
        assert_eq!(exchange(&client, datagram).await, b"Y");
    }

    assert_eq!(
        calls.snapshot(),
        vec![
            DriverCall::Event(true),
            DriverCall::Sync(false),
            DriverCall::Update {
                sync: false,
                event: false
            },
        ]
    );
}

#[tokio::test]
async fn test_shutdown_datagram_is_acknowledged_then_server_terminates() {
    let (client, calls, server) = start_server().await;

    let reply = exchange(&client, b"X").await;
    let termination = server.await.expect("server task");

    assert_eq!(reply, b"Y");
    assert!(matches!(termination, Termination::Requested));
    assert_eq!(calls.shutdown_count(), 1);
}

#[tokio::test]
async fn test_unrecognised_datagram_is_acknowledged_then_server_terminates() {
    // Arrange
    let (client, calls, server) = start_server().await;

    // Act
    let reply = exchange(&client, b"Q").await;
    let termination = server.await.expect("server task");

    // Assert
    assert_eq!(reply, b"Y");
    assert!(matches!(
        termination,
        Termination::Protocol(ProtocolError::UnknownCommand(b'Q'))
    ));
    assert_eq!(calls.snapshot(), vec![DriverCall::Shutdown]);
}

#[tokio::test]
async fn test_empty_datagram_is_acknowledged_then_server_terminates() {
    let (client, _calls, server) = start_server().await;

    let reply = exchange(&client, &[]).await;
    let termination = server.await.expect("server task");

    assert_eq!(reply, b"Y");
    assert!(matches!(
        termination,
        Termination::Protocol(ProtocolError::EmptyDatagram)
    ));
}

#[tokio::test]
async fn test_replies_go_to_each_sender() {
    let (first, calls, server_task) = start_server().await;
    let server = first.peer_addr().unwrap();
    let second = UdpSocket::bind(loopback()).await.unwrap();
    second.connect(server).await.unwrap();

    assert_eq!(exchange(&first, b"1").await, b"Y");
    assert_eq!(exchange(&second, b"A").await, b"Y");

    assert_eq!(
        calls.snapshot(),
        vec![DriverCall::Sync(true), DriverCall::Event(true)]
    );
    assert!(!server_task.is_finished());
}
