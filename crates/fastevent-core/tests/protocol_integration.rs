//! Integration tests for the fastevent-core public API.
//!
//! These tests use the crate the way the server does: decode what a client
//! sent, apply it to a driver obtained from the registry, and check what the
//! driver saw.

use fastevent_core::driver::mock::{DriverCall, MockOutputDriver};
use fastevent_core::protocol::commands::multiplex;
use fastevent_core::protocol::{encode_datagram, encode_frame, ACK_DATAGRAM, ACK_FRAME};
use fastevent_core::{
    decode_datagram, decode_frame, DriverError, DriverOptions, DriverRegistry, DummyFactory,
    OutputDriver, ProtocolError, Request,
};

/// Applies a decoded request the way the server's dispatch does.
fn apply(driver: &mut dyn OutputDriver, request: Request) {
    match request {
        Request::Sync(v) => driver.sync(v),
        Request::Event(v) => driver.event(v),
        Request::Update { sync, event } => driver.update(sync, event),
        _ => {}
    }
}

#[test]
fn test_stream_frames_drive_the_mock_driver() {
    // Arrange
    let mut driver = MockOutputDriver::new();
    let calls = driver.calls();
    let wire: &[u8] = b"1\r\nA\r\nD\r\n2\r\n";

    // Act
    for frame in wire.chunks(3) {
        apply(&mut driver, decode_frame(frame).unwrap());
    }

    // Assert
    assert_eq!(
        calls.snapshot(),
        vec![
            DriverCall::Sync(true),
            DriverCall::Event(true),
            DriverCall::Event(false),
            DriverCall::Sync(false),
        ]
    );
}

#[test]
fn test_multiplexed_datagram_is_a_single_update() {
    let mut driver = MockOutputDriver::new();
    let calls = driver.calls();

    apply(&mut driver, decode_datagram(&[multiplex(false, true)]).unwrap());

    assert_eq!(
        calls.snapshot(),
        vec![DriverCall::Update {
            sync: false,
            event: true
        }]
    );
}

#[test]
fn test_client_encoders_match_server_decoders() {
    for request in [
        Request::Sync(true),
        Request::Event(false),
        Request::Shutdown,
    ] {
        assert_eq!(decode_frame(&encode_frame(request)).unwrap(), request);
        assert_eq!(decode_datagram(&encode_datagram(request)).unwrap(), request);
    }
    let update = Request::Update {
        sync: true,
        event: false,
    };
    assert_eq!(decode_datagram(&encode_datagram(update)).unwrap(), update);
}

#[test]
fn test_acknowledgments_start_with_y() {
    assert_eq!(&ACK_FRAME, b"Y\r\n");
    assert_eq!(&ACK_DATAGRAM, b"Y");
}

#[test]
fn test_short_frame_and_empty_datagram_are_errors() {
    assert_eq!(
        decode_frame(b"A\r"),
        Err(ProtocolError::InsufficientData {
            needed: 3,
            available: 2
        })
    );
    assert_eq!(decode_datagram(&[]), Err(ProtocolError::EmptyDatagram));
}

#[test]
fn test_registry_resolves_dummy_and_rejects_unknown() {
    // Arrange
    let mut registry = DriverRegistry::new();
    registry.register(DummyFactory);

    // Act
    let mut dummy = registry
        .resolve("dummy", &DriverOptions::new(), true)
        .expect("dummy is registered");
    let missing = registry.resolve("leonardo", &DriverOptions::new(), true);

    // Assert
    apply(dummy.as_mut(), Request::Event(true));
    dummy.shutdown();
    assert_eq!(dummy.identifier(), "dummy");
    assert!(matches!(missing, Err(DriverError::NotFound(name)) if name == "leonardo"));
}
