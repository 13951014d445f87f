use std::time::Instant;

use oocsi_wire::{parse_event, Data, Event, MESSAGE_ID};

use crate::calls::{CallCompletion, CallRegistry};
use crate::subscriptions::{EventHandler, SubscriptionTable};

/// Outcome of classifying one inbound frame.
///
/// The router only decides; the caller performs the dispatch after releasing
/// the state lock, so user handlers never run with client state locked.
pub(crate) enum Routing {
    /// A call response consumed from the registry. `expired` means the
    /// response arrived too late and the callback must be dropped unfired.
    CallResponse {
        data: Data,
        on_complete: CallCompletion,
        expired: bool,
    },
    /// A channel event with a matching subscription handler.
    Deliver { handler: EventHandler, event: Event },
    /// A parseable event nobody is listening for.
    Unhandled { event: Event },
    /// An unparseable frame; dropped.
    ParseFailure { error: oocsi_wire::WireError },
}

/// Classify an inbound frame against the call registry and the
/// subscription table.
///
/// Call responses take precedence over subscriptions: an event whose data
/// carries a known correlation id completes the pending call, with the id
/// stripped from the payload, and the registry entry is removed whether or
/// not the call has expired. The keep-alive probe is short-circuited by the
/// reader loop before frames reach this point.
pub(crate) fn route(
    line: &str,
    now: Instant,
    calls: &mut CallRegistry,
    subscriptions: &SubscriptionTable,
) -> Routing {
    let mut event = match parse_event(line) {
        Ok(event) => event,
        Err(error) => return Routing::ParseFailure { error },
    };

    if let Some(id) = event.correlation_id().map(str::to_string) {
        if let Some(call) = calls.take(&id) {
            event.data.remove(MESSAGE_ID);
            return Routing::CallResponse {
                data: event.data,
                on_complete: call.on_complete,
                expired: now >= call.expires_at,
            };
        }
    }

    match subscriptions.get(&event.recipient) {
        Some(handler) => Routing::Deliver { handler, event },
        None => Routing::Unhandled { event },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn registry_with(id: &str, expires_at: Instant) -> CallRegistry {
        let mut calls = CallRegistry::default();
        calls.insert(id.to_string(), expires_at, Box::new(|_data| {}));
        calls
    }

    #[test]
    fn routes_call_response_and_strips_id() {
        let now = Instant::now();
        let mut calls = registry_with("id-1", now + Duration::from_secs(1));
        let subscriptions = SubscriptionTable::default();

        let line = r#"{"sender":"echoer","recipient":"me","data":{"_MESSAGE_ID":"id-1","v":5}}"#;
        match route(line, now, &mut calls, &subscriptions) {
            Routing::CallResponse { data, expired, .. } => {
                assert!(!expired);
                assert!(data.get(MESSAGE_ID).is_none());
                assert_eq!(data.get("v"), Some(&serde_json::json!(5)));
            }
            _ => panic!("expected call response"),
        }
        assert_eq!(calls.len(), 0);
    }

    #[test]
    fn expired_response_is_consumed_but_flagged() {
        let now = Instant::now();
        let mut calls = registry_with("id-2", now - Duration::from_millis(1));
        let subscriptions = SubscriptionTable::default();

        let line = r#"{"sender":"s","recipient":"me","data":{"_MESSAGE_ID":"id-2"}}"#;
        match route(line, now, &mut calls, &subscriptions) {
            Routing::CallResponse { expired, .. } => assert!(expired),
            _ => panic!("expected call response"),
        }
        // Entry removed regardless of expiry.
        assert_eq!(calls.len(), 0);
    }

    #[test]
    fn unknown_correlation_id_falls_through_to_subscription() {
        let now = Instant::now();
        let mut calls = CallRegistry::default();
        let mut subscriptions = SubscriptionTable::default();
        let delivered = Arc::new(AtomicUsize::new(0));
        let delivered_clone = Arc::clone(&delivered);
        subscriptions.insert(
            "me",
            Arc::new(move |_event| {
                delivered_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        // A correlation id we never issued; treated as a plain event.
        let line = r#"{"sender":"s","recipient":"me","data":{"_MESSAGE_ID":"stranger"}}"#;
        match route(line, now, &mut calls, &subscriptions) {
            Routing::Deliver { handler, event } => {
                // The id stays in the payload for plain deliveries.
                assert_eq!(event.correlation_id(), Some("stranger"));
                handler(&event);
            }
            _ => panic!("expected delivery"),
        }
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn routes_channel_event_to_handler() {
        let now = Instant::now();
        let mut calls = CallRegistry::default();
        let mut subscriptions = SubscriptionTable::default();
        subscriptions.insert("room", Arc::new(|_event| {}));

        let line = r#"{"sender":"a","recipient":"room","data":{"x":1}}"#;
        assert!(matches!(
            route(line, now, &mut calls, &subscriptions),
            Routing::Deliver { .. }
        ));
    }

    #[test]
    fn unmatched_event_is_unhandled() {
        let now = Instant::now();
        let mut calls = CallRegistry::default();
        let subscriptions = SubscriptionTable::default();

        let line = r#"{"sender":"a","recipient":"nowhere","data":{}}"#;
        match route(line, now, &mut calls, &subscriptions) {
            Routing::Unhandled { event } => assert_eq!(event.recipient, "nowhere"),
            _ => panic!("expected unhandled"),
        }
    }

    #[test]
    fn garbage_is_a_parse_failure() {
        let now = Instant::now();
        let mut calls = CallRegistry::default();
        let subscriptions = SubscriptionTable::default();

        assert!(matches!(
            route("{{{", now, &mut calls, &subscriptions),
            Routing::ParseFailure { .. }
        ));
    }
}
