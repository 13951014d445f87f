use std::time::Duration;

use uuid::Uuid;

/// Default OOCSI server port.
pub const DEFAULT_PORT: u16 = 4444;

/// Configuration for an OOCSI client connection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server endpoint as `host:port`.
    pub endpoint: String,
    /// Client identity announced on connect. Generated when `None`.
    pub name: Option<String>,
    /// Timeout for each TCP connect attempt.
    pub connect_timeout: Duration,
    /// Whether to keep reconnecting after the connection drops.
    pub reconnect: bool,
    /// Interval of the reconnect maintenance timer.
    pub reconnect_interval: Duration,
    /// Bounded delay for operations waiting out the `Connecting` state.
    pub wait_poll_interval: Duration,
}

impl ClientConfig {
    /// Configuration for an endpoint with default policies.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// The configured client identity, or a generated one.
    pub fn client_name(&self) -> String {
        self.name.clone().unwrap_or_else(generated_name)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: format!("localhost:{DEFAULT_PORT}"),
            name: None,
            connect_timeout: Duration::from_secs(5),
            reconnect: true,
            reconnect_interval: Duration::from_secs(1),
            wait_poll_interval: Duration::from_millis(200),
        }
    }
}

/// Generate a client identity: `oocsi_rs_` plus 8 hex chars of randomness.
fn generated_name() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("oocsi_rs_{}", &id[..8])
}
