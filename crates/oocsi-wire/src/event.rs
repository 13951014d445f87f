use serde::{Deserialize, Serialize};

use crate::control::MESSAGE_ID;
use crate::error::Result;

/// Payload of an event: an unordered key → value mapping of JSON values.
pub type Data = serde_json::Map<String, serde_json::Value>;

/// An inbound event frame.
///
/// `recipient` is the channel or client name the event was delivered to;
/// `sender` is the identity of the originating client. Unknown fields sent
/// by newer servers (timestamps and the like) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub sender: String,
    pub recipient: String,
    #[serde(default)]
    pub data: Data,
}

impl Event {
    /// The correlation id tagged onto this event, if any.
    pub fn correlation_id(&self) -> Option<&str> {
        self.data.get(MESSAGE_ID).and_then(|v| v.as_str())
    }
}

/// Parse a received line as an event frame.
pub fn parse_event(line: &str) -> Result<Event> {
    Ok(serde_json::from_str(line)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_event() {
        let event =
            parse_event(r#"{"sender":"a","recipient":"room","data":{"x":1}}"#).unwrap();
        assert_eq!(event.sender, "a");
        assert_eq!(event.recipient, "room");
        assert_eq!(event.data.get("x"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn parse_event_without_data() {
        let event = parse_event(r#"{"sender":"a","recipient":"room"}"#).unwrap();
        assert!(event.data.is_empty());
    }

    #[test]
    fn parse_event_ignores_unknown_fields() {
        let event = parse_event(
            r#"{"sender":"a","recipient":"room","data":{},"timestamp":1700000000}"#,
        )
        .unwrap();
        assert_eq!(event.recipient, "room");
    }

    #[test]
    fn parse_rejects_non_event_json() {
        assert!(parse_event(r#"{"just":"junk"}"#).is_err());
        assert!(parse_event("not json at all").is_err());
    }

    #[test]
    fn correlation_id_accessor() {
        let event = parse_event(
            r#"{"sender":"a","recipient":"echo","data":{"_MESSAGE_ID":"abc-123","v":5}}"#,
        )
        .unwrap();
        assert_eq!(event.correlation_id(), Some("abc-123"));

        let plain = parse_event(r#"{"sender":"a","recipient":"room","data":{"v":5}}"#).unwrap();
        assert_eq!(plain.correlation_id(), None);
    }
}
