use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use oocsi_wire::Data;

use crate::client::Inner;

/// Callback invoked with the new value after every accepted change.
pub type ChangeListener = Arc<dyn Fn(&Value) + Send + Sync + 'static>;

/// A value kept in sync with one field of one channel's events.
///
/// Created through [`OocsiClient::variable`](crate::OocsiClient::variable).
/// Setting the value locally publishes `{key: value}` to the channel; a
/// remote event carrying the key updates the value through the same path,
/// which republishes it once (the set of a value already held is a no-op,
/// so the echo terminates). Clones share state.
#[derive(Clone)]
pub struct OocsiVariable {
    inner: Arc<VarInner>,
}

struct VarInner {
    client: Weak<Inner>,
    channel: String,
    key: String,
    state: Mutex<VarState>,
}

#[derive(Default)]
struct VarState {
    value: Option<Value>,
    listeners: Vec<ChangeListener>,
}

impl OocsiVariable {
    pub(crate) fn new(client: Weak<Inner>, channel: &str, key: &str) -> Self {
        Self {
            inner: Arc::new(VarInner {
                client,
                channel: channel.to_string(),
                key: key.to_string(),
                state: Mutex::new(VarState::default()),
            }),
        }
    }

    /// The channel this variable is bound to.
    pub fn channel(&self) -> &str {
        &self.inner.channel
    }

    /// The event field this variable mirrors.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Current value, if one has been set or received.
    pub fn get(&self) -> Option<Value> {
        self.inner.state.lock().value.clone()
    }

    /// Set the value. Setting the value already held is a no-op; a change
    /// notifies listeners and publishes `{key: value}` to the channel.
    pub fn set(&self, value: Value) {
        let listeners: Vec<ChangeListener> = {
            let mut state = self.inner.state.lock();
            if state.value.as_ref() == Some(&value) {
                return;
            }
            state.value = Some(value.clone());
            // Cloned out so listeners run without the variable locked.
            state.listeners.clone()
        };
        for listener in &listeners {
            listener(&value);
        }

        let mut data = Data::new();
        data.insert(self.inner.key.clone(), value);
        match self.inner.client.upgrade() {
            Some(client) => client.send_data(&self.inner.channel, &data),
            None => {
                debug!(channel = %self.inner.channel, "client gone; dropping variable publish")
            }
        }
    }

    /// Add a change listener. Listeners accumulate and fire in registration
    /// order, on whichever thread performs the change.
    pub fn on_change(&self, listener: impl Fn(&Value) + Send + Sync + 'static) {
        self.inner.state.lock().listeners.push(Arc::new(listener));
    }
}

impl std::fmt::Debug for OocsiVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OocsiVariable")
            .field("channel", &self.inner.channel)
            .field("key", &self.inner.key)
            .field("value", &self.inner.state.lock().value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    fn detached() -> OocsiVariable {
        // A dead client reference; set() keeps its local semantics and
        // skips the network publish.
        OocsiVariable::new(Weak::new(), "color", "hue")
    }

    #[test]
    fn get_returns_last_value() {
        let var = detached();
        assert!(var.get().is_none());
        var.set(json!(200));
        assert_eq!(var.get(), Some(json!(200)));
        var.set(json!("teal"));
        assert_eq!(var.get(), Some(json!("teal")));
    }

    #[test]
    fn unchanged_value_is_a_no_op() {
        let var = detached();
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changes);
        var.on_change(move |_value| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        var.set(json!(5));
        var.set(json!(5));
        assert_eq!(changes.load(Ordering::SeqCst), 1);

        var.set(json!(6));
        assert_eq!(changes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let var = detached();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            var.on_change(move |value| {
                log.lock().push((tag, value.clone()));
            });
        }

        var.set(json!(1));
        assert_eq!(
            *log.lock(),
            vec![("first", json!(1)), ("second", json!(1))]
        );
    }

    #[test]
    fn clones_share_state() {
        let var = detached();
        let twin = var.clone();
        var.set(json!(42));
        assert_eq!(twin.get(), Some(json!(42)));
    }
}
