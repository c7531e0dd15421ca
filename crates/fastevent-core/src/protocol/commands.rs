//! The FastEvent wire command set.
//!
//! Every request a client sends is a single command byte.  The same bytes are
//! used by both transport disciplines; only the framing around them differs
//! (see [`crate::protocol::codec`]).
//!
//! | byte  | meaning                                   |
//! |-------|-------------------------------------------|
//! | `'1'` | sync channel on                           |
//! | `'2'` | sync channel off                          |
//! | `'A'` | event channel on                          |
//! | `'D'` | event channel off                         |
//! | `'X'` | shut the whole server down                |
//! | `'Y'` | acknowledgment (server → client only)     |
//!
//! # Multiplexed commands (for beginners)
//!
//! The four channel codes were chosen so that OR-ing one sync code with one
//! event code produces a byte that collides with no other code:
//!
//! ```text
//! '1' | 'A' = 0x31 | 0x41 = 0x71    sync on,  event on
//! '1' | 'D' = 0x31 | 0x44 = 0x75    sync on,  event off
//! '2' | 'A' = 0x32 | 0x41 = 0x73    sync off, event on
//! '2' | 'D' = 0x32 | 0x44 = 0x76    sync off, event off
//! ```
//!
//! A client can therefore change both channels with one byte, and the server
//! applies the change as one atomic `update(sync, event)` call.  Only the
//! connectionless discipline accepts multiplexed bytes.

// ── Command bytes ─────────────────────────────────────────────────────────────

/// Turns the sync channel on.
pub const SYNC_ON: u8 = b'1';
/// Turns the sync channel off.
pub const SYNC_OFF: u8 = b'2';
/// Turns the event channel on.
pub const EVENT_ON: u8 = b'A';
/// Turns the event channel off.
pub const EVENT_OFF: u8 = b'D';
/// Asks the server to terminate.
pub const SHUTDOWN: u8 = b'X';
/// Acknowledgment sent back for every handled request.
pub const ACK: u8 = b'Y';

/// Carriage return; ignored as a datagram trailer.
pub const CR: u8 = b'\r';
/// Line feed; ignored as a datagram trailer.
pub const LF: u8 = b'\n';

// ── Decoded request ───────────────────────────────────────────────────────────

/// A decoded client request, independent of the framing it arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Set the sync channel.
    Sync(bool),
    /// Set the event channel.
    Event(bool),
    /// Set both channels in one atomic driver call (multiplexed command).
    Update { sync: bool, event: bool },
    /// Terminate the server after acknowledging.
    Shutdown,
    /// Nothing to apply; a bare `\r` or `\n` datagram.
    Noop,
    /// A command byte that is not part of the command set.
    Unknown(u8),
}

impl Request {
    /// Maps a single (non-multiplexed) command byte to a request.
    ///
    /// Bytes outside the command set map to [`Request::Unknown`].
    pub fn from_command_byte(byte: u8) -> Self {
        match byte {
            SYNC_ON => Request::Sync(true),
            SYNC_OFF => Request::Sync(false),
            EVENT_ON => Request::Event(true),
            EVENT_OFF => Request::Event(false),
            SHUTDOWN => Request::Shutdown,
            other => Request::Unknown(other),
        }
    }

    /// Returns the single command byte that encodes this request, if any.
    ///
    /// [`Request::Update`] yields its multiplexed byte; [`Request::Noop`]
    /// yields a bare line feed.
    pub fn command_byte(&self) -> u8 {
        match *self {
            Request::Sync(on) => sync_code(on),
            Request::Event(on) => event_code(on),
            Request::Update { sync, event } => multiplex(sync, event),
            Request::Shutdown => SHUTDOWN,
            Request::Noop => LF,
            Request::Unknown(byte) => byte,
        }
    }
}

/// Returns the sync channel code for `on`.
pub const fn sync_code(on: bool) -> u8 {
    if on {
        SYNC_ON
    } else {
        SYNC_OFF
    }
}

/// Returns the event channel code for `on`.
pub const fn event_code(on: bool) -> u8 {
    if on {
        EVENT_ON
    } else {
        EVENT_OFF
    }
}

/// Combines one sync code and one event code into a multiplexed byte.
pub const fn multiplex(sync: bool, event: bool) -> u8 {
    sync_code(sync) | event_code(event)
}

/// Splits a multiplexed byte back into its `(sync, event)` pair.
///
/// Returns `None` when `byte` is not one of the four multiplexed codes.
pub fn demultiplex(byte: u8) -> Option<(bool, bool)> {
    [(true, true), (true, false), (false, true), (false, false)]
        .into_iter()
        .find(|&(sync, event)| multiplex(sync, event) == byte)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
