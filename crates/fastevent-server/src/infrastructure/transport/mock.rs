//! Scripted in-memory transport for tests.
//!
//! `MockTransport` is cheap to clone: every clone shares the same buffers,
//! so a test keeps one handle for assertions while the driver owns another.
//!
//! ```rust
//! use fastevent_server::infrastructure::transport::mock::MockTransport;
//! use fastevent_server::infrastructure::transport::ByteTransport;
//!
//! let probe = MockTransport::new();
//! let mut transport = probe.clone();
//!
//! probe.inject_read(b"K");
//! transport.write_byte(b'1').unwrap();
//!
//! assert_eq!(transport.read_byte().unwrap(), b'K');
//! assert_eq!(probe.written(), b"1");
//! ```
//!
//! Reading from an empty buffer returns [`TransportError::Closed`] rather
//! than blocking, which is how a test simulates the device going away.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ByteTransport, TransportError};

#[derive(Debug, Default)]
struct Inner {
    read_buffer: VecDeque<u8>,
    written: Vec<u8>,
    reads: usize,
    writes_left: Option<usize>,
    fail_reads: bool,
    closed: bool,
}

/// In-memory [`ByteTransport`] with failure injection.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues bytes for later `read_byte` calls.
    pub fn inject_read(&self, data: &[u8]) {
        self.lock().read_buffer.extend(data);
    }

    /// Every byte written so far, in order.
    pub fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    pub fn clear_written(&self) {
        self.lock().written.clear();
    }

    /// Number of successful `read_byte` calls.
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Lets `n` more writes succeed, then fails every write with an I/O error.
    pub fn fail_writes_after(&self, n: usize) {
        self.lock().writes_left = Some(n);
    }

    /// Makes every subsequent read fail with an I/O error.
    pub fn fail_reads(&self) {
        self.lock().fail_reads = true;
    }
}

impl ByteTransport for MockTransport {
    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(TransportError::Closed);
        }
        if inner.fail_reads {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "injected read failure").into());
        }
        let byte = inner.read_buffer.pop_front().ok_or(TransportError::Closed)?;
        inner.reads += 1;
        Ok(byte)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(TransportError::Closed);
        }
        match inner.writes_left {
            Some(0) => {
                return Err(
                    io::Error::new(io::ErrorKind::BrokenPipe, "injected write failure").into(),
                )
            }
            Some(ref mut left) => *left -= 1,
            None => {}
        }
        inner.written.push(byte);
        Ok(())
    }

    fn close(&mut self) {
        self.lock().closed = true;
    }
}
