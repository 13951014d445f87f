use std::collections::HashMap;
use std::time::Instant;

use oocsi_wire::Data;
use uuid::Uuid;

/// Completion callback of an outbound call. Invoked at most once.
pub type CallCompletion = Box<dyn FnOnce(Data) + Send + 'static>;

/// One outstanding call awaiting its response.
pub(crate) struct PendingCall {
    pub expires_at: Instant,
    pub on_complete: CallCompletion,
}

/// Correlation id → pending call mapping.
///
/// Entries are created when a call is issued and consumed exactly once when
/// a response with the matching id arrives. Expiry is passive: an entry that
/// outlives its timeout stays in the map until a late response reclaims it,
/// at which point the callback is dropped instead of invoked. Ids are v4
/// uuids and never reused, so a late response can only match its own entry.
#[derive(Default)]
pub(crate) struct CallRegistry {
    pending: HashMap<String, PendingCall>,
}

impl CallRegistry {
    /// Generate a fresh correlation id (128 bits of randomness).
    pub fn correlation_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Register a pending call under a correlation id.
    pub fn insert(&mut self, id: String, expires_at: Instant, on_complete: CallCompletion) {
        self.pending.insert(id, PendingCall {
            expires_at,
            on_complete,
        });
    }

    /// Consume the pending call for a correlation id, if any.
    ///
    /// The entry is removed whether or not it has expired, which guarantees
    /// at most one invocation per id and bounds registry growth for
    /// answered calls.
    pub fn take(&mut self, id: &str) -> Option<PendingCall> {
        self.pending.remove(id)
    }

    /// Discard a pending call without invoking it (failed sends).
    pub fn discard(&mut self, id: &str) {
        self.pending.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn correlation_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(CallRegistry::correlation_id()));
        }
    }

    #[test]
    fn take_consumes_exactly_once() {
        let mut registry = CallRegistry::default();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);

        let id = CallRegistry::correlation_id();
        registry.insert(
            id.clone(),
            Instant::now() + Duration::from_secs(1),
            Box::new(move |_data| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert!(registry.contains(&id));

        let call = registry.take(&id).unwrap();
        (call.on_complete)(Data::new());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Second take finds nothing.
        assert!(registry.take(&id).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn expired_entry_is_still_removed_on_take() {
        let mut registry = CallRegistry::default();
        let id = CallRegistry::correlation_id();
        registry.insert(
            id.clone(),
            Instant::now() - Duration::from_millis(1),
            Box::new(|_data| panic!("expired callback must not be invoked")),
        );

        let call = registry.take(&id).unwrap();
        assert!(call.expires_at < Instant::now());
        // Caller checks expiry and drops the callback; the entry is gone.
        drop(call);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn discard_drops_without_invoking() {
        let mut registry = CallRegistry::default();
        let id = CallRegistry::correlation_id();
        registry.insert(
            id.clone(),
            Instant::now() + Duration::from_secs(1),
            Box::new(|_data| panic!("discarded callback must not be invoked")),
        );
        registry.discard(&id);
        assert!(!registry.contains(&id));
    }
}
