//! # Subscriber registry: identity → callback mapping.
//!
//! Plain keyed storage used by [`EventNotifier`](crate::EventNotifier). It
//! owns no lock; the notifier serializes every access to it.
//!
//! ## Rules
//! - One callback per identity; inserting an existing identity replaces it
//! - Removing an unknown identity is a no-op
//! - [`snapshot`](SubscriberRegistry::snapshot) copies the current entries so
//!   callers can invoke them without holding the registry

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Shared subscriber callback.
pub(crate) type Callback<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Keyed set of subscriber callbacks.
pub(crate) struct SubscriberRegistry<T, K> {
    entries: HashMap<K, Callback<T>>,
}

impl<T, K> SubscriberRegistry<T, K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers `callback` under `id`, returning the callback it replaced.
    pub fn insert(&mut self, id: K, callback: Callback<T>) -> Option<Callback<T>> {
        self.entries.insert(id, callback)
    }

    /// Removes the registration for `id`, if any.
    pub fn remove(&mut self, id: &K) -> Option<Callback<T>> {
        self.entries.remove(id)
    }

    /// Removes the registration for `id` only if `matches` accepts it.
    ///
    /// Lets an owner remove its own entry without touching a replacement
    /// registered under the same identity.
    pub fn remove_if<P>(&mut self, id: &K, matches: P) -> Option<Callback<T>>
    where
        P: FnOnce(&Callback<T>) -> bool,
    {
        if self.entries.get(id).is_some_and(matches) {
            self.entries.remove(id)
        } else {
            None
        }
    }

    /// Removes every registration and returns them.
    pub fn drain(&mut self) -> Vec<Callback<T>> {
        self.entries.drain().map(|(_, cb)| cb).collect()
    }

    /// Returns true if `id` is registered.
    pub fn contains(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    /// Copies the current registrations (unspecified order).
    pub fn snapshot(&self) -> Vec<(K, Callback<T>)> {
        self.entries
            .iter()
            .map(|(id, cb)| (id.clone(), Arc::clone(cb)))
            .collect()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T, K> Default for SubscriberRegistry<T, K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Callback<u32> {
        let log = Arc::clone(log);
        Arc::new(move |v| log.lock().unwrap().push(format!("{tag}:{v}")))
    }

    #[test]
    fn test_insert_replaces_existing_identity() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg: SubscriberRegistry<u32, &str> = SubscriberRegistry::new();

        assert!(reg.insert("a", recorder(&log, "first")).is_none());
        let replaced = reg.insert("a", recorder(&log, "second"));
        assert!(replaced.is_some());
        assert_eq!(reg.len(), 1);

        for (_, cb) in reg.snapshot() {
            cb(7);
        }
        assert_eq!(*log.lock().unwrap(), vec!["second:7".to_string()]);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut reg: SubscriberRegistry<u32, &str> = SubscriberRegistry::default();
        assert!(reg.remove(&"missing").is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached_from_later_changes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg: SubscriberRegistry<u32, u8> = SubscriberRegistry::new();
        reg.insert(1, recorder(&log, "one"));

        let snap = reg.snapshot();
        reg.remove(&1);
        reg.insert(2, recorder(&log, "two"));

        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].0, 1);
        assert!(reg.contains(&2));
        assert!(!reg.contains(&1));
    }

    #[test]
    fn test_drain_empties() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg: SubscriberRegistry<u32, u8> = SubscriberRegistry::new();
        reg.insert(1, recorder(&log, "one"));
        reg.insert(2, recorder(&log, "two"));

        assert_eq!(reg.drain().len(), 2);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_if_spares_replacement() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reg: SubscriberRegistry<u32, u8> = SubscriberRegistry::new();
        let original = recorder(&log, "original");
        reg.insert(1, Arc::clone(&original));
        reg.insert(1, recorder(&log, "replacement"));

        assert!(reg.remove_if(&1, |cb| Arc::ptr_eq(cb, &original)).is_none());
        assert!(reg.contains(&1));

        let current = reg.snapshot().remove(0).1;
        assert!(reg.remove_if(&1, |cb| Arc::ptr_eq(cb, &current)).is_some());
        assert!(reg.is_empty());
        assert!(reg.remove_if(&1, |_| true).is_none());
    }
}
