use std::collections::HashMap;
use std::sync::Arc;

use oocsi_wire::Event;

/// Callback invoked for every event delivered to a subscribed channel.
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

/// Channel name → handler mapping.
///
/// Durable across reconnects: the connection manager replays every entry as
/// a fresh `subscribe` line after each successful open, because the server
/// holds no subscription state across connections. Unsubscribing deletes
/// the entry, so an explicitly dropped channel is never replayed.
#[derive(Default)]
pub(crate) struct SubscriptionTable {
    handlers: HashMap<String, EventHandler>,
}

impl SubscriptionTable {
    /// Store a handler for a channel. Last writer wins.
    pub fn insert(&mut self, channel: &str, handler: EventHandler) {
        self.handlers.insert(channel.to_string(), handler);
    }

    /// Remove the handler for a channel.
    pub fn remove(&mut self, channel: &str) -> Option<EventHandler> {
        self.handlers.remove(channel)
    }

    /// Look up the handler for a channel.
    pub fn get(&self, channel: &str) -> Option<EventHandler> {
        self.handlers.get(channel).cloned()
    }

    /// Snapshot of subscribed channel names, sorted for deterministic replay.
    pub fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.handlers.keys().cloned().collect();
        channels.sort();
        channels
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_handler(counter: Arc<AtomicUsize>) -> EventHandler {
        Arc::new(move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn test_event(recipient: &str) -> Event {
        oocsi_wire::parse_event(&format!(
            r#"{{"sender":"s","recipient":"{recipient}","data":{{}}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn last_writer_wins() {
        let mut table = SubscriptionTable::default();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        table.insert("room", counting_handler(Arc::clone(&first)));
        table.insert("room", counting_handler(Arc::clone(&second)));
        assert_eq!(table.len(), 1);

        let handler = table.get("room").unwrap();
        handler(&test_event("room"));

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn remove_deletes_entry() {
        let mut table = SubscriptionTable::default();
        table.insert("room", counting_handler(Arc::new(AtomicUsize::new(0))));

        assert!(table.remove("room").is_some());
        assert!(table.get("room").is_none());
        assert!(table.channels().is_empty());

        // Removing twice is harmless.
        assert!(table.remove("room").is_none());
    }

    #[test]
    fn channels_snapshot_is_sorted() {
        let mut table = SubscriptionTable::default();
        for name in ["zebra", "alpha", "mid"] {
            table.insert(name, counting_handler(Arc::new(AtomicUsize::new(0))));
        }
        assert_eq!(table.channels(), vec!["alpha", "mid", "zebra"]);
    }
}
