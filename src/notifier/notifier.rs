//! # Keyed event notifier with synchronous fan-out.
//!
//! [`EventNotifier`] maps subscriber identities to callbacks and invokes all
//! of them on every [`notify`](EventNotifier::notify).
//!
//! ## Architecture
//! ```text
//! platform callback thread            any thread / task
//!   notify(v) ──┐                       subscribe(id, cb) / unsubscribe(&id)
//!               ▼                                  │
//!        lock ─► latest = v                        ▼
//!             ─► snapshot = registry.clone() ◄── lock ─► registry.insert/remove
//!        unlock
//!               │
//!               ├──► cb1(v.clone())   (catch_unwind)
//!               ├──► cb2(v.clone())   (catch_unwind)
//!               └──► cbN(v.clone())   (catch_unwind)
//!               │
//!               └──► Ok(()) or Err(CallbackPanicked { failures })
//! ```
//!
//! ## Rules
//! - **Snapshot delivery**: a round reaches exactly the subscribers registered
//!   when it started; subscribe/unsubscribe calls made during the round
//!   (including from inside a callback) only affect later rounds
//! - **No lock during callbacks**: callbacks may call back into the notifier
//! - **No ordering** between subscribers; per-subscriber order equals emission order
//!   for emissions made from one thread
//! - **No back-pressure**: a slow callback blocks `notify` for its duration
//! - **No replay**: a new subscriber only sees values notified after it subscribed
//! - **Duplicate identity** silently replaces the previous callback
//!
//! ## Panic handling
//! Each callback runs under `catch_unwind`:
//! - the panic is logged with the subscriber identity
//! - the remaining subscribers of the round are still invoked
//! - once the round is over, `notify` returns [`NotifyError::CallbackPanicked`]
//!   listing every failure
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a callback panics while holding a lock of its own.

use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::id::SubscriberId;
use super::registry::{Callback, SubscriberRegistry};
use crate::bridge::EventStream;
use crate::config::StreamConfig;
use crate::error::{panic_message, CallbackFailure, NotifyError};
use crate::subscribers::Subscribe;

struct Inner<T, K> {
    subscribers: SubscriberRegistry<T, K>,
    latest: Option<T>,
}

/// Fan-out point between push-style producers and any number of subscribers.
///
/// Share it with `Arc`; every method takes `&self` and none of them suspends.
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use tunnel_events::{ConnectionState, EventNotifier, SubscriberId};
///
/// let notifier = EventNotifier::<ConnectionState>::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let id = SubscriberId::generate();
/// let sink = Arc::clone(&seen);
/// notifier.subscribe(id, move |state| sink.lock().unwrap().push(state));
///
/// notifier.notify(ConnectionState::Bound).unwrap();
/// notifier.unsubscribe(&id);
/// notifier.notify(ConnectionState::Unbound).unwrap();
///
/// assert_eq!(*seen.lock().unwrap(), vec![ConnectionState::Bound]);
/// ```
///
/// The callback registry is only reachable through the notifier:
/// ```compile_fail
/// use tunnel_events::SubscriberRegistry;
/// ```
pub struct EventNotifier<T, K = SubscriberId> {
    inner: Mutex<Inner<T, K>>,
}

impl<T, K> EventNotifier<T, K>
where
    T: Clone,
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Creates a notifier with no subscribers and no latest value.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                subscribers: SubscriberRegistry::new(),
                latest: None,
            }),
        }
    }

    /// Creates a notifier whose [`latest`](Self::latest) starts at `initial`.
    ///
    /// The initial value is never delivered to subscribers.
    pub fn with_initial(initial: T) -> Self {
        let me = Self::new();
        me.lock().latest = Some(initial);
        me
    }

    /// Registers `callback` under `id`.
    ///
    /// If `id` is already registered its callback is replaced; this is not an
    /// error. Past values are not replayed.
    pub fn subscribe<F>(&self, id: K, callback: F)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.register(id, Arc::new(callback));
    }

    pub(crate) fn register(&self, id: K, callback: Callback<T>) {
        let replaced = self.lock().subscribers.insert(id.clone(), callback);
        if replaced.is_some() {
            tracing::debug!(subscriber = ?id, "replaced existing subscriber callback");
        }
    }

    /// Registers a [`Subscribe`] implementation under `id`.
    ///
    /// Same replacement semantics as [`subscribe`](Self::subscribe).
    pub fn attach<S>(&self, id: K, subscriber: Arc<S>)
    where
        S: Subscribe<T> + ?Sized,
    {
        tracing::debug!(subscriber = ?id, name = subscriber.name(), "attaching subscriber");
        self.subscribe(id, move |event: T| subscriber.on_event(&event));
    }

    /// Removes the registration for `id`. Unknown identities are ignored.
    pub fn unsubscribe(&self, id: &K) {
        let removed = self.lock().subscribers.remove(id);
        if removed.is_some() {
            tracing::trace!(subscriber = ?id, "unsubscribed");
        }
    }

    /// Removes `id` only while it still maps to `callback`.
    ///
    /// Returns false if the entry is gone or was replaced.
    pub(crate) fn unsubscribe_if(&self, id: &K, callback: &Weak<dyn Fn(T) + Send + Sync>) -> bool {
        let removed = self
            .lock()
            .subscribers
            .remove_if(id, |current| Weak::ptr_eq(&Arc::downgrade(current), callback));
        if removed.is_some() {
            tracing::trace!(subscriber = ?id, "unsubscribed");
            true
        } else {
            false
        }
    }

    /// Removes every registration and returns how many there were.
    ///
    /// Open [`EventStream`]s observing this notifier end as exhausted.
    pub fn unsubscribe_all(&self) -> usize {
        let removed = self.lock().subscribers.drain();
        removed.len()
    }

    /// Delivers `value` to every subscriber registered at call time.
    ///
    /// Each callback receives its own clone. All subscribers of the round are
    /// attempted even if some of them panic.
    ///
    /// # Errors
    /// [`NotifyError::CallbackPanicked`] if at least one callback panicked.
    pub fn notify(&self, value: T) -> Result<(), NotifyError> {
        let snapshot = {
            let mut inner = self.lock();
            inner.latest = Some(value.clone());
            inner.subscribers.snapshot()
        };

        let attempted = snapshot.len();
        let mut failures = Vec::new();

        for (id, callback) in snapshot {
            let event = value.clone();
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || callback(event))) {
                let message = panic_message(payload.as_ref());
                tracing::error!(subscriber = ?id, panic = %message, "subscriber callback panicked");
                failures.push(CallbackFailure {
                    subscriber: format!("{id:?}"),
                    message,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(NotifyError::CallbackPanicked {
                attempted,
                failures,
            })
        }
    }

    /// Returns the most recently notified value (or the initial one).
    pub fn latest(&self) -> Option<T> {
        self.lock().latest.clone()
    }

    /// Returns true if `id` is currently registered.
    pub fn is_subscribed(&self, id: &K) -> bool {
        self.lock().subscribers.contains(id)
    }

    /// Number of active registrations.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// True if at least one subscriber is registered.
    pub fn has_subscribers(&self) -> bool {
        !self.lock().subscribers.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T, K>> {
        // Callbacks never run under this lock, so poisoning cannot leave the
        // registry half-updated.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, K> EventNotifier<T, K>
where
    T: Clone + Send + 'static,
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + From<SubscriberId> + 'static,
{
    /// Opens a stream bridge with the default [`StreamConfig`].
    ///
    /// The stream subscribes on its first poll and unsubscribes when closed
    /// or dropped.
    pub fn open_stream(self: &Arc<Self>) -> EventStream<T, K> {
        EventStream::new(self, StreamConfig::default())
    }

    /// Opens a stream bridge with the given buffering settings.
    pub fn open_stream_with(self: &Arc<Self>, config: StreamConfig) -> EventStream<T, K> {
        EventStream::new(self, config)
    }
}

impl<T, K> Default for EventNotifier<T, K>
where
    T: Clone,
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> fmt::Debug for EventNotifier<T, K>
where
    T: Clone,
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
