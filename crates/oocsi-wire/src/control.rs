//! Client → server control lines and protocol tokens.
//!
//! The OOCSI wire protocol is plain text: the first line of a connection is
//! the client identity (the join handshake), after which the client emits
//! `subscribe`, `unsubscribe` and `sendjson` control lines. The server sends
//! JSON event frames plus an out-of-band keep-alive probe.

use crate::error::Result;
use crate::event::Data;

/// Server → client keep-alive probe token.
///
/// Must be answered with [`KEEPALIVE_ACK`] promptly or the server drops the
/// connection as dead.
pub const KEEPALIVE_PROBE: &str = "ping";

/// Client → server keep-alive acknowledgement token.
pub const KEEPALIVE_ACK: &str = ".";

/// Payload field carrying the correlation id of a call/response pair.
pub const MESSAGE_ID: &str = "_MESSAGE_ID";

/// Payload field carrying the handle name of the called responder.
pub const MESSAGE_HANDLE: &str = "_MESSAGE_HANDLE";

/// Build a `subscribe` control line for a channel.
pub fn subscribe_line(channel: &str) -> String {
    format!("subscribe {channel}")
}

/// Build an `unsubscribe` control line for a channel.
pub fn unsubscribe_line(channel: &str) -> String {
    format!("unsubscribe {channel}")
}

/// Build a `sendjson` control line delivering `data` to a channel or client.
pub fn send_json_line(recipient: &str, data: &Data) -> Result<String> {
    let json = serde_json::to_string(data)?;
    Ok(format!("sendjson {recipient} {json}"))
}
