//! Protocol module containing the command set and the framing codec.

pub mod codec;
pub mod commands;

pub use codec::{
    decode_datagram, decode_frame, encode_datagram, encode_frame, ProtocolError, ACK_DATAGRAM,
    ACK_FRAME, FRAME_WIDTH, MAX_DATAGRAM_SIZE,
};
pub use commands::Request;
