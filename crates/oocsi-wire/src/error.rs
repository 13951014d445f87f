/// Errors that can occur while framing or parsing protocol lines.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// An I/O error occurred on the underlying stream.
    #[error("wire I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum length.
    #[error("line too long: {len} bytes (max {max})")]
    LineTooLong { len: usize, max: usize },

    /// An outbound line contained an embedded newline.
    #[error("line contains embedded newline")]
    EmbeddedNewline,

    /// A received line was not valid UTF-8.
    #[error("invalid UTF-8 in line: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The connection was closed by the peer.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, WireError>;
