//! OOCSI client: connection lifecycle, subscriptions, calls and reactive
//! variables over the line protocol from `oocsi-wire`.
//!
//! The central type is [`OocsiClient`]. It owns a background maintenance
//! thread that (re)connects on a fixed interval, and one reader thread per
//! live connection that dispatches inbound frames to subscription handlers
//! and call completions. All public operations are fire and forget: while
//! the connection is down they are dropped silently, and transport failures
//! surface through logs and the optional [`on_error`](OocsiClient::on_error)
//! sink rather than through return values.

pub mod client;
pub mod config;
pub mod error;
pub mod state;
pub mod variable;

mod calls;
mod router;
mod subscriptions;

pub use client::OocsiClient;
pub use config::{ClientConfig, DEFAULT_PORT};
pub use error::{ClientError, Result};
pub use state::ConnectionState;
pub use variable::{ChangeListener, OocsiVariable};

pub use oocsi_wire::{Data, Event};
