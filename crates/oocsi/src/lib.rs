//! Client for the OOCSI messaging protocol.
//!
//! OOCSI is a text-based publish/subscribe protocol for connecting devices,
//! sketches and services through a central server. This crate bundles the
//! client stack: TCP transport, newline-delimited wire protocol, and the
//! connection-managing client with subscriptions, call/response and reactive
//! variables.
//!
//! # Crate Structure
//!
//! - [`transport`] — TCP stream setup and teardown
//! - [`wire`] — Line framing, control lines and event frames
//! - [`client`] — Connection lifecycle, subscriptions, calls, variables
//!
//! # Example
//!
//! ```no_run
//! use oocsi::client::{ClientConfig, OocsiClient};
//!
//! let client = OocsiClient::connect(ClientConfig::new("localhost:4444"));
//! client.subscribe("testchannel", |event| {
//!     println!("{}: {:?}", event.sender, event.data);
//! });
//! ```

/// Re-export transport types.
pub mod transport {
    pub use oocsi_transport::*;
}

/// Re-export wire protocol types.
pub mod wire {
    pub use oocsi_wire::*;
}

/// Re-export client types.
pub mod client {
    pub use oocsi_client::*;
}

pub use oocsi_client::{ClientConfig, Data, Event, OocsiClient, OocsiVariable};
