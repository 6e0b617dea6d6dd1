//! # Bounded hand-off between `notify` and one stream consumer.
//!
//! ```text
//! notify thread                              consumer task
//!   forward(v) ─► Outbox ─► tokio channel (cap N) ─► Inbox::poll_recv ─► Some(v)
//!
//!   DropNewest: mpsc,      try_send; Full  → v discarded, counted by the sender
//!   DropOldest: broadcast, send;     oldest overwritten, counted on Lagged(n)
//! ```
//!
//! ## Rules
//! - **Never blocks** the pushing side
//! - **FIFO** for values that were kept
//! - Dropping the [`Inbox`] discards buffered values; later pushes report `Closed`
//! - Dropping the [`Outbox`] lets the consumer drain what is buffered, then
//!   yields `None`
//! - `broadcast` rounds its capacity up to a power of two, so `DropOldest`
//!   may keep slightly more than `capacity` values

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::StreamExt;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::config::{OverflowPolicy, StreamConfig};

/// Result of a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Push {
    /// Value handed to the channel.
    Queued,
    /// Value discarded because the buffer was full.
    DroppedNewest,
    /// Value discarded because the consumer is gone.
    Closed,
}

enum Tx<T> {
    Bounded(mpsc::Sender<T>),
    Ring(broadcast::Sender<T>),
}

enum Rx<T> {
    Bounded(mpsc::Receiver<T>),
    Ring(BroadcastStream<T>),
}

/// Producer half, owned by the notifier callback.
pub(crate) struct Outbox<T> {
    tx: Tx<T>,
    dropped: Arc<AtomicU64>,
}

/// Consumer half, owned by the stream.
pub(crate) struct Inbox<T> {
    rx: Rx<T>,
    dropped: Arc<AtomicU64>,
}

/// Opens a channel sized and shaped by `config`.
///
/// Values lost to the overflow policy are added to `dropped`.
pub(crate) fn channel<T>(config: &StreamConfig, dropped: Arc<AtomicU64>) -> (Outbox<T>, Inbox<T>)
where
    T: Clone + Send + 'static,
{
    let cap = config.capacity_clamped();
    let (tx, rx) = match config.overflow {
        OverflowPolicy::DropNewest => {
            let (tx, rx) = mpsc::channel(cap);
            (Tx::Bounded(tx), Rx::Bounded(rx))
        }
        OverflowPolicy::DropOldest => {
            let (tx, rx) = broadcast::channel(cap);
            (Tx::Ring(tx), Rx::Ring(BroadcastStream::new(rx)))
        }
    };
    (
        Outbox {
            tx,
            dropped: Arc::clone(&dropped),
        },
        Inbox { rx, dropped },
    )
}

impl<T> Outbox<T> {
    pub(crate) fn push(&self, value: T) -> Push {
        match &self.tx {
            Tx::Bounded(tx) => match tx.try_send(value) {
                Ok(()) => Push::Queued,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    Push::DroppedNewest
                }
                Err(mpsc::error::TrySendError::Closed(_)) => Push::Closed,
            },
            // Overwrites are seen by the receiver as `Lagged`.
            Tx::Ring(tx) => match tx.send(value) {
                Ok(_) => Push::Queued,
                Err(_) => Push::Closed,
            },
        }
    }
}

impl<T> Inbox<T>
where
    T: Clone + Send + 'static,
{
    /// Polls for the next value.
    ///
    /// `Ready(None)` once the producer is gone and the buffer is drained.
    pub(crate) fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<T>> {
        match &mut self.rx {
            Rx::Bounded(rx) => rx.poll_recv(cx),
            Rx::Ring(rx) => loop {
                match rx.poll_next_unpin(cx) {
                    Poll::Ready(Some(Ok(v))) => return Poll::Ready(Some(v)),
                    Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(n)))) => {
                        self.dropped.fetch_add(n, Ordering::Relaxed);
                        tracing::warn!(dropped = n, policy = "drop_oldest", "stream buffer full");
                    }
                    Poll::Ready(None) => return Poll::Ready(None),
                    Poll::Pending => return Poll::Pending,
                }
            },
        }
    }
}
