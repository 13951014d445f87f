//! Newline-delimited text framing and protocol lines for OOCSI.
//!
//! The OOCSI wire format is text lines over a persistent socket:
//! - the first line of a connection is the client identity (join handshake)
//! - `subscribe <channel>` / `unsubscribe <channel>` manage channel routing
//! - `sendjson <recipient> <json>` delivers a payload to a channel or client
//! - the server sends JSON event frames and an out-of-band `ping` probe,
//!   answered with `.`
//!
//! No partial reads, no buffer management in user code.

pub mod codec;
pub mod control;
pub mod error;
pub mod event;
pub mod reader;
pub mod writer;

pub use codec::{decode_line, LineConfig, DEFAULT_MAX_LINE};
pub use control::{
    send_json_line, subscribe_line, unsubscribe_line, KEEPALIVE_ACK, KEEPALIVE_PROBE,
    MESSAGE_HANDLE, MESSAGE_ID,
};
pub use error::{Result, WireError};
pub use event::{parse_event, Data, Event};
pub use reader::LineReader;
pub use writer::LineWriter;
