//! # Stream bridge over a notifier.
//!
//! Turns one notifier subscription into an asynchronous, cancellable
//! [`Stream`](futures::Stream) of values.
//!
//! ```text
//! notify(v) ──► forward callback ──► tokio mpsc / broadcast ──► EventStream::poll_next ──► consumer
//!                      ▲                                               │
//!                      └───── unsubscribe (id, forward) ◄── close / drop / token
//! ```
//!
//! The bridge owns no thread and no task. Values are pushed by whichever
//! thread calls `notify`, and pulled by whichever task polls the stream.

mod mailbox;
mod stream;

pub use stream::{BridgeState, EventStream};
