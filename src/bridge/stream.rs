//! # EventStream: one notifier subscription as a cancellable `Stream`.
//!
//! ## Lifecycle
//! ```text
//!            first poll_next()                 close() / drop / token cancelled
//! Created ───────────────────────► Subscribed ─────────────────────────────────► Cancelled
//!    │     register(fresh id, forward)    │     drop inbox, remove (id, forward) once
//!    │                                    │
//!    │ notifier already gone              │ registration gone (notifier dropped,
//!    ▼                                    ▼ unsubscribe_all, id re-subscribed)
//! Exhausted ◄─────────────────────────────┘ drain buffer, then None; no unsubscribe
//! ```
//!
//! `close()` on a stream whose registration is already gone or replaced also
//! ends `Exhausted`: the entry is removed only while it still holds this
//! stream's own forward callback.
//!
//! ## Rules
//! - **Lazy**: nothing is registered until the first poll
//! - **Exactly-once cleanup**: `Subscribed → Cancelled` runs `unsubscribe` once,
//!   on every exit path (explicit close, drop, cancellation token)
//! - **Terminal states**: once `Cancelled`/`Exhausted`, every poll yields `None`;
//!   open a new stream to observe the notifier again
//! - **Bounded**: see [`StreamConfig`]; `notify` never waits for this consumer
//! - **Weak source**: the stream holds a `Weak` to the notifier and never keeps it alive
//!
//! ## Leaks
//! `Drop` is the cleanup guarantee. A stream passed to `std::mem::forget`
//! never unsubscribes and its callback stays registered until the notifier
//! itself is dropped.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::stream::{FusedStream, Stream};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use super::mailbox::{self, Inbox, Push};
use crate::config::StreamConfig;
use crate::notifier::{Callback, EventNotifier, SubscriberId};

/// Lifecycle state of an [`EventStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Opened, not yet polled; nothing registered.
    Created,
    /// Registered on the notifier and forwarding values.
    Subscribed,
    /// Ended by the consumer. Terminal.
    Cancelled,
    /// Ended because the source went away. Terminal.
    Exhausted,
}

impl BridgeState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, BridgeState::Cancelled | BridgeState::Exhausted)
    }
}

/// Live registration of a subscribed stream.
struct Link<T, K> {
    id: K,
    inbox: Inbox<T>,
    /// The registered callback, compared by address on removal.
    forward: Weak<dyn Fn(T) + Send + Sync>,
}

/// Cancellable, lazily subscribed sequence of notified values.
///
/// Created by [`EventNotifier::open_stream`] or [`EventStream::new`].
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use futures::{FutureExt, StreamExt};
/// use tunnel_events::{BridgeState, ConnectionState, EventNotifier};
///
/// # futures::executor::block_on(async {
/// let notifier = Arc::new(EventNotifier::<ConnectionState>::new());
/// let mut stream = notifier.open_stream();
///
/// // First poll subscribes.
/// assert!(stream.next().now_or_never().is_none());
/// assert_eq!(stream.state(), BridgeState::Subscribed);
///
/// notifier.notify(ConnectionState::Bound).unwrap();
/// assert_eq!(stream.next().await, Some(ConnectionState::Bound));
///
/// stream.close();
/// assert_eq!(notifier.subscriber_count(), 0);
/// # });
/// ```
pub struct EventStream<T, K = SubscriberId>
where
    T: Clone,
    K: Eq + Hash + Clone + fmt::Debug,
{
    notifier: Weak<EventNotifier<T, K>>,
    config: StreamConfig,
    state: BridgeState,
    link: Option<Link<T, K>>,
    dropped: Arc<AtomicU64>,
    cancel: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
}

// No field is structurally pinned.
impl<T, K> Unpin for EventStream<T, K>
where
    T: Clone,
    K: Eq + Hash + Clone + fmt::Debug,
{
}

impl<T, K> EventStream<T, K>
where
    T: Clone + Send + 'static,
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + From<SubscriberId> + 'static,
{
    /// Opens a stream over `notifier`. Nothing is registered until the first poll.
    pub fn new(notifier: &Arc<EventNotifier<T, K>>, config: StreamConfig) -> Self {
        Self {
            notifier: Arc::downgrade(notifier),
            config,
            state: BridgeState::Created,
            link: None,
            dropped: Arc::new(AtomicU64::new(0)),
            cancel: None,
        }
    }

    /// Ends the stream when `token` is cancelled.
    ///
    /// Cancellation is observed on the next poll; dropping the stream still
    /// releases the registration immediately.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(Box::pin(token.cancelled_owned()));
        self
    }

    fn subscribe(&mut self) -> bool {
        let Some(notifier) = self.notifier.upgrade() else {
            self.state = BridgeState::Exhausted;
            return false;
        };

        let id = K::from(SubscriberId::generate());
        let (outbox, inbox) = mailbox::channel(&self.config, Arc::clone(&self.dropped));
        let fwd_id = id.clone();

        let forward: Callback<T> = Arc::new(move |value: T| {
            if outbox.push(value) == Push::DroppedNewest {
                tracing::warn!(subscriber = ?fwd_id, policy = "drop_newest", "stream buffer full");
            }
        });
        let weak = Arc::downgrade(&forward);
        notifier.register(id.clone(), forward);

        tracing::debug!(subscriber = ?id, capacity = self.config.capacity_clamped(), "stream subscribed");
        self.link = Some(Link {
            id,
            inbox,
            forward: weak,
        });
        self.state = BridgeState::Subscribed;
        true
    }

    fn exhaust(&mut self) {
        self.state = BridgeState::Exhausted;
        if let Some(link) = self.link.take() {
            tracing::debug!(subscriber = ?link.id, "stream source gone");
        }
    }
}

impl<T, K> EventStream<T, K>
where
    T: Clone,
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Current lifecycle state.
    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Identity registered on the notifier, while subscribed.
    pub fn id(&self) -> Option<&K> {
        self.link.as_ref().map(|l| &l.id)
    }

    /// Buffering settings of this stream.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Values lost to the overflow policy so far.
    ///
    /// With [`OverflowPolicy::DropOldest`](crate::OverflowPolicy::DropOldest)
    /// evictions are counted when the consumer reaches the gap.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Cancels the stream.
    ///
    /// If subscribed, buffered values are discarded and the notifier
    /// registration is removed before this returns. A registration that was
    /// already removed or replaced is left alone and the stream ends
    /// [`Exhausted`](BridgeState::Exhausted). Idempotent.
    pub fn close(&mut self) {
        match self.state {
            BridgeState::Created => {
                self.state = BridgeState::Cancelled;
            }
            BridgeState::Subscribed => {
                let Some(Link { id, inbox, forward }) = self.link.take() else {
                    self.state = BridgeState::Cancelled;
                    return;
                };
                // Dropping the inbox first turns any forward still running
                // from an in-flight snapshot into a no-op.
                drop(inbox);
                let removed = self
                    .notifier
                    .upgrade()
                    .is_some_and(|n| n.unsubscribe_if(&id, &forward));

                if removed {
                    self.state = BridgeState::Cancelled;
                    tracing::debug!(subscriber = ?id, "stream cancelled");
                } else {
                    self.state = BridgeState::Exhausted;
                    tracing::debug!(subscriber = ?id, "stream closed after its source went away");
                }
            }
            BridgeState::Cancelled | BridgeState::Exhausted => {}
        }
    }
}

impl<T, K> Stream for EventStream<T, K>
where
    T: Clone + Send + 'static,
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + From<SubscriberId> + 'static,
{
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();

        match this.state {
            BridgeState::Cancelled | BridgeState::Exhausted => return Poll::Ready(None),
            BridgeState::Created => {
                if !this.subscribe() {
                    return Poll::Ready(None);
                }
            }
            BridgeState::Subscribed => {}
        }

        if let Some(cancel) = this.cancel.as_mut() {
            if cancel.as_mut().poll(cx).is_ready() {
                this.close();
                return Poll::Ready(None);
            }
        }

        let polled = match this.link.as_mut() {
            Some(link) => link.inbox.poll_recv(cx),
            None => Poll::Ready(None),
        };

        if let Poll::Ready(None) = polled {
            this.exhaust();
        }
        polled
    }
}

impl<T, K> FusedStream for EventStream<T, K>
where
    T: Clone + Send + 'static,
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + From<SubscriberId> + 'static,
{
    fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }
}

impl<T, K> Drop for EventStream<T, K>
where
    T: Clone,
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn drop(&mut self) {
        self.close();
    }
}

impl<T, K> fmt::Debug for EventStream<T, K>
where
    T: Clone,
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("state", &self.state)
            .field("id", &self.link.as_ref().map(|l| &l.id))
            .field("config", &self.config)
            .finish()
    }
}
