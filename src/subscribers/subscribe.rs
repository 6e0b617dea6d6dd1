//! # Core subscriber trait
//!
//! `Subscribe` is the object form of a notifier callback. Register one with
//! [`EventNotifier::attach`](crate::EventNotifier::attach); it is then invoked
//! like any closure subscriber.
//!
//! ## Contract
//! - `on_event` runs **synchronously** on the thread that called `notify`;
//!   a slow implementation delays every other subscriber of the round.
//! - A panic is caught by the notifier, logged, and reported to the caller of
//!   `notify`; it does not unregister the subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use tunnel_events::{ConnectionState, EventNotifier, Subscribe, SubscriberId};
//!
//! #[derive(Default)]
//! struct BoundFlag(AtomicBool);
//!
//! impl Subscribe<ConnectionState> for BoundFlag {
//!     fn on_event(&self, event: &ConnectionState) {
//!         self.0.store(event.is_bound(), Ordering::SeqCst);
//!     }
//!     fn name(&self) -> &'static str { "bound-flag" }
//! }
//!
//! let notifier = EventNotifier::<ConnectionState>::new();
//! let flag = Arc::new(BoundFlag::default());
//! notifier.attach(SubscriberId::generate(), Arc::clone(&flag));
//!
//! notifier.notify(ConnectionState::Bound).unwrap();
//! assert!(flag.0.load(Ordering::SeqCst));
//! ```

/// Contract for event subscribers.
pub trait Subscribe<T>: Send + Sync + 'static {
    /// Handle a single event.
    ///
    /// # Parameters
    /// - `event`: the subscriber's own clone of the notified value
    fn on_event(&self, event: &T);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
