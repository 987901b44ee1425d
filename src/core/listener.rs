//! Rate change subscribers

use std::collections::HashMap;
use std::sync::Arc;

/// Receives a notification every time a source reports a rate that differs
/// from the one it reported before.
pub trait RateListener: Send + Sync {
    fn on_rate_changed(&self, source_name: &str, new_rate: f64);
}

/// Identity of a registered listener, derived from its `Arc` allocation.
///
/// Two listeners that compare equal structurally are still distinct
/// subscribers. The set keeps each `Arc` alive, so an address can't be
/// reused while its listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ListenerId(usize);

impl ListenerId {
    fn of(listener: &Arc<dyn RateListener>) -> Self {
        ListenerId(Arc::as_ptr(listener) as *const () as usize)
    }
}

/// Unordered set of listeners keyed by identity.
#[derive(Default, Clone)]
pub struct ListenerSet {
    listeners: HashMap<ListenerId, Arc<dyn RateListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the listener was not registered yet.
    pub fn insert(&mut self, listener: Arc<dyn RateListener>) -> bool {
        let id = ListenerId::of(&listener);
        if self.listeners.contains_key(&id) {
            return false;
        }
        self.listeners.insert(id, listener);
        true
    }

    /// Returns `true` if the listener was registered.
    pub fn remove(&mut self, listener: &Arc<dyn RateListener>) -> bool {
        self.listeners.remove(&ListenerId::of(listener)).is_some()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn contains(&self, listener: &Arc<dyn RateListener>) -> bool {
        self.listeners.contains_key(&ListenerId::of(listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn notify_all(&self, source_name: &str, new_rate: f64) {
        for listener in self.listeners.values() {
            listener.on_rate_changed(source_name, new_rate);
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.listeners.len())
            .finish()
    }
}
