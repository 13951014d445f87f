/// Errors that can occur in client operations.
///
/// None of these terminate the client: they are surfaced through tracing
/// and the registered error hook while the client keeps running best-effort.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (connect failure, mid-session I/O error).
    #[error("transport error: {0}")]
    Transport(#[from] oocsi_transport::TransportError),

    /// Wire-level error (framing, serialization, connection loss).
    #[error("wire error: {0}")]
    Wire(#[from] oocsi_wire::WireError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
