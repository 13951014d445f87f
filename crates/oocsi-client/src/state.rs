/// Lifecycle state of the client connection.
///
/// `Disconnected → Connecting → Open → Disconnected`. The reconnect
/// maintenance thread only acts while `Disconnected`; public operations
/// wait out `Connecting` before deciding whether to proceed or no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected; the reconnect timer may start a new attempt.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// Connected, identity announced, subscriptions replayed.
    Open,
}

impl ConnectionState {
    /// Returns true if the connection is live.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if a connect attempt is in flight.
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
        }
    }
}
