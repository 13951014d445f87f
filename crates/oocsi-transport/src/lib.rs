//! Blocking TCP socket transport for the OOCSI client.
//!
//! This is the lowest layer of the client: it knows how to open a socket to
//! an endpoint and move bytes, nothing else. Protocol framing lives in
//! `oocsi-wire`; connection lifecycle lives in `oocsi-client`.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::SocketStream;
pub use tcp::TcpSocket;
