use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr};

use crate::error::Result;

/// A connected socket stream implementing Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
/// Currently wraps a TCP stream; the inner enum leaves room for other
/// socket flavors (TLS, WebSocket) without changing the client layer.
pub struct SocketStream {
    inner: SocketStreamInner,
}

enum SocketStreamInner {
    Tcp(std::net::TcpStream),
}

impl Read for SocketStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            SocketStreamInner::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for SocketStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            SocketStreamInner::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            SocketStreamInner::Tcp(stream) => stream.flush(),
        }
    }
}

impl SocketStream {
    /// Create a SocketStream from a TCP stream.
    pub(crate) fn from_tcp(stream: std::net::TcpStream) -> Self {
        Self {
            inner: SocketStreamInner::Tcp(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            SocketStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            SocketStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    ///
    /// Used to hand one half to a dedicated reader thread while the
    /// writer stays with the connection owner.
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            SocketStreamInner::Tcp(stream) => {
                let cloned = stream.try_clone()?;
                Ok(Self::from_tcp(cloned))
            }
        }
    }

    /// The address of the connected peer.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        match &self.inner {
            SocketStreamInner::Tcp(stream) => stream.peer_addr().map_err(Into::into),
        }
    }

    /// Shut down both directions of the stream.
    ///
    /// Unblocks a reader thread parked in `read` on another clone of this
    /// stream; subsequent reads observe EOF.
    pub fn shutdown(&self) -> Result<()> {
        match &self.inner {
            SocketStreamInner::Tcp(stream) => match stream.shutdown(Shutdown::Both) {
                Ok(()) => Ok(()),
                // Already closed by the peer; nothing left to do.
                Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
                Err(err) => Err(err.into()),
            },
        }
    }
}

impl std::fmt::Debug for SocketStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            SocketStreamInner::Tcp(stream) => f
                .debug_struct("SocketStream")
                .field("type", &"tcp")
                .field("peer", &stream.peer_addr().ok())
                .finish(),
        }
    }
}
