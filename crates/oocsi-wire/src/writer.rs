use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};

use crate::codec::LineConfig;
use crate::error::{Result, WireError};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes protocol lines to any `Write` stream.
///
/// Flushes after every line; the protocol is interactive and a buffered
/// subscribe or keep-alive acknowledgement is as good as none.
pub struct LineWriter<T> {
    inner: T,
    buf: BytesMut,
    config: LineConfig,
}

impl<T: Write> LineWriter<T> {
    /// Create a new line writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line writer with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write one line followed by the terminator (blocking).
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        if line.len() > self.config.max_line_len {
            return Err(WireError::LineTooLong {
                len: line.len(),
                max: self.config.max_line_len,
            });
        }
        if line.contains('\n') {
            return Err(WireError::EmbeddedNewline);
        }

        self.buf.clear();
        self.buf.reserve(line.len() + 1);
        self.buf.put_slice(line.as_bytes());
        self.buf.put_u8(b'\n');

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(WireError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
