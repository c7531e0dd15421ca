//! Framing for the two FastEvent transport disciplines.
//!
//! Connection-oriented (TCP) wire format, both directions:
//! ```text
//! [command:1]['\r']['\n']
//! ```
//! Exactly [`FRAME_WIDTH`] bytes per request and per acknowledgment.  The
//! trailer is not validated on decode.
//!
//! Connectionless (UDP) wire format:
//! ```text
//! request:  [command:1][ignored trailer:0..]
//! response: ['Y']
//! ```
//! A datagram's first byte may also be a multiplexed command (see
//! [`crate::protocol::commands`]).

use thiserror::Error;

use crate::protocol::commands::{demultiplex, Request, ACK, CR, LF};

/// Size of one request or acknowledgment frame on a stream connection.
pub const FRAME_WIDTH: usize = 3;

/// Largest datagram the server reads; anything beyond the first byte is ignored.
pub const MAX_DATAGRAM_SIZE: usize = 32;

/// Acknowledgment frame sent on stream connections.
pub const ACK_FRAME: [u8; FRAME_WIDTH] = [ACK, CR, LF];

/// Acknowledgment datagram sent on the connectionless socket.
pub const ACK_DATAGRAM: [u8; 1] = [ACK];

/// Errors that can occur while decoding wire data.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte slice is shorter than one frame.
    #[error("insufficient data: need {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// A datagram with no payload at all.
    #[error("empty datagram")]
    EmptyDatagram,

    /// A command byte outside the command set.
    #[error("unknown command: 0x{0:02X}")]
    UnknownCommand(u8),
}

// ── Stream framing ────────────────────────────────────────────────────────────

/// Decodes one stream frame.
///
/// Only the first byte is interpreted; unknown command bytes decode to
/// [`Request::Unknown`] so the caller can log and still acknowledge them.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] if `frame` is shorter than
/// [`FRAME_WIDTH`].
///
/// # Examples
///
/// ```rust
/// use fastevent_core::protocol::{decode_frame, Request};
///
/// assert_eq!(decode_frame(b"A\r\n").unwrap(), Request::Event(true));
/// ```
pub fn decode_frame(frame: &[u8]) -> Result<Request, ProtocolError> {
    if frame.len() < FRAME_WIDTH {
        return Err(ProtocolError::InsufficientData {
            needed: FRAME_WIDTH,
            available: frame.len(),
        });
    }
    Ok(Request::from_command_byte(frame[0]))
}

/// Encodes a request as a stream frame.
pub fn encode_frame(request: Request) -> [u8; FRAME_WIDTH] {
    [request.command_byte(), CR, LF]
}

// ── Datagram framing ──────────────────────────────────────────────────────────

/// Decodes one datagram.
///
/// Bare `\r`/`\n` decode to [`Request::Noop`], multiplexed bytes to
/// [`Request::Update`].  Trailing bytes are ignored.
///
/// # Errors
///
/// Returns [`ProtocolError::EmptyDatagram`] for a zero-length datagram.
///
/// # Examples
///
/// ```rust
/// use fastevent_core::protocol::{decode_datagram, Request};
///
/// let request = decode_datagram(&[0x31 | 0x41]).unwrap();
/// assert_eq!(request, Request::Update { sync: true, event: true });
/// ```
pub fn decode_datagram(datagram: &[u8]) -> Result<Request, ProtocolError> {
    let &first = datagram.first().ok_or(ProtocolError::EmptyDatagram)?;

    if first == CR || first == LF {
        return Ok(Request::Noop);
    }
    if let Some((sync, event)) = demultiplex(first) {
        return Ok(Request::Update { sync, event });
    }
    Ok(Request::from_command_byte(first))
}

/// Encodes a request as a one-byte datagram.
pub fn encode_datagram(request: Request) -> [u8; 1] {
    [request.command_byte()]
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::commands::{multiplex, SHUTDOWN};

    // ── Stream frames ─────────────────────────────────────────────────────────

    #[test]
    fn test_decode_frame_event_on() {
        // Arrange
        let frame = *b"A\r\n";

        // Act
        let request = decode_frame(&frame).unwrap();

        // Assert
        assert_eq!(request, Request::Event(true));
    }

    #[test]
    fn test_decode_frame_shutdown() {
        assert_eq!(decode_frame(b"X\r\n").unwrap(), Request::Shutdown);
    }

    #[test]
    fn test_decode_frame_does_not_validate_trailer() {
        assert_eq!(decode_frame(b"1ab").unwrap(), Request::Sync(true));
    }

    #[test]
    fn test_decode_frame_unknown_command_is_not_an_error() {
        assert_eq!(decode_frame(b"Q\r\n").unwrap(), Request::Unknown(b'Q'));
    }

    #[test]
    fn test_decode_frame_multiplexed_byte_is_unknown_on_streams() {
        let frame = [multiplex(true, true), CR, LF];
        assert_eq!(decode_frame(&frame).unwrap(), Request::Unknown(0x71));
    }

    #[test]
    fn test_decode_frame_rejects_short_input() {
        assert_eq!(
            decode_frame(b"A\r"),
            Err(ProtocolError::InsufficientData { needed: 3, available: 2 })
        );
    }

    #[test]
    fn test_encode_frame_appends_crlf() {
        assert_eq!(encode_frame(Request::Sync(false)), *b"2\r\n");
    }

    #[test]
    fn test_ack_frame_is_y_crlf() {
        assert_eq!(&ACK_FRAME, b"Y\r\n");
    }

    // ── Datagrams ─────────────────────────────────────────────────────────────

    #[test]
    fn test_decode_datagram_multiplexed_sync_on_event_on() {
        assert_eq!(
            decode_datagram(&[0x31 | 0x41]).unwrap(),
            Request::Update { sync: true, event: true }
        );
    }

    #[test]
    fn test_decode_datagram_multiplexed_sync_off_event_on() {
        assert_eq!(
            decode_datagram(&[b'2' | b'A']).unwrap(),
            Request::Update { sync: false, event: true }
        );
    }

    #[test]
    fn test_decode_datagram_ignores_trailing_crlf() {
        assert_eq!(decode_datagram(b"D\r\n").unwrap(), Request::Event(false));
    }

    #[test]
    fn test_decode_datagram_bare_line_endings_are_noops() {
        assert_eq!(decode_datagram(b"\r").unwrap(), Request::Noop);
        assert_eq!(decode_datagram(b"\n").unwrap(), Request::Noop);
        assert_eq!(decode_datagram(b"\r\n").unwrap(), Request::Noop);
    }

    #[test]
    fn test_decode_datagram_unknown_first_byte() {
        assert_eq!(decode_datagram(b"Z").unwrap(), Request::Unknown(b'Z'));
    }

    #[test]
    fn test_decode_datagram_rejects_empty_payload() {
        assert_eq!(decode_datagram(&[]), Err(ProtocolError::EmptyDatagram));
    }

    #[test]
    fn test_encode_datagram_shutdown() {
        assert_eq!(encode_datagram(Request::Shutdown), [SHUTDOWN]);
    }

    #[test]
    fn test_protocol_error_display_names_command_in_hex() {
        let e = ProtocolError::UnknownCommand(0x5A);
        assert_eq!(e.to_string(), "unknown command: 0x5A");
    }
}
