use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::SocketStream;

/// TCP socket transport.
///
/// Provides blocking connect against a `host:port` endpoint. Each call
/// produces a fresh stream; the client layer owns reconnection policy.
pub struct TcpSocket;

impl TcpSocket {
    /// Connect to an OOCSI server endpoint (blocking, with timeout).
    ///
    /// The endpoint is resolved via DNS and every resolved address is tried
    /// in order; the first successful connection wins. Nagle's algorithm is
    /// disabled because the protocol is interactive line traffic.
    pub fn connect(endpoint: &str, timeout: Duration) -> Result<SocketStream> {
        let addrs: Vec<_> = endpoint
            .to_socket_addrs()
            .map_err(|e| TransportError::Resolve {
                endpoint: endpoint.to_string(),
                source: e,
            })?
            .collect();

        let mut last_err: Option<std::io::Error> = None;
        for addr in addrs {
            debug!(%addr, "attempting connection");
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    info!(endpoint, %addr, "connected");
                    return Ok(SocketStream::from_tcp(stream));
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(TransportError::Connect {
            endpoint: endpoint.to_string(),
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    "endpoint resolved to no addresses",
                )
            }),
        })
    }
}
