//! # tunnel-events
//!
//! **tunnel-events** carries state changes from a VPN client's platform layer
//! (service binding, tunnel configuration, tunnel lifecycle) to any number of
//! observers, and exposes each subscription as an asynchronous, cancellable
//! stream.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   platform service layer             tunnel-management layer
//!   (ConnectionState)                  (TunnelConfig, TunnelStateTransition, ...)
//!          │                                        │
//!          ▼                                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventNotifier<T, K>                                              │
//! │  - SubscriberRegistry (identity → callback, under a mutex)        │
//! │  - latest value (inspection only, never replayed)                 │
//! │  - notify(v): snapshot registry, unlock, call each callback       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   closure(v)        Subscribe::on_event   forward(v) ──► tokio mpsc / broadcast
//!   (subscribe)       (attach, LogWriter)                      │
//!                                                              ▼
//!                                                   EventStream (futures::Stream)
//!                                                              │
//!                                                   close / drop / CancellationToken
//!                                                              │
//!                                                   unsubscribe(id) exactly once
//! ```
//!
//! ### Stream lifecycle
//! ```text
//! Created ──first poll──► Subscribed ──close/drop/token──► Cancelled
//!    │                        │
//!    └── notifier gone ──►  Exhausted ◄── registration removed by someone else
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Notifier**      | Keyed subscribe / unsubscribe / notify, safe from any thread.  | [`EventNotifier`], [`SubscriberId`]         |
//! | **Stream bridge** | One subscription as a lazy, cancellable `Stream`.              | [`EventStream`], [`BridgeState`]            |
//! | **Subscriber API**| Object-style subscribers with a name.                          | [`Subscribe`]                               |
//! | **Payloads**      | Immutable, serde-enabled VPN state values.                     | [`ConnectionState`], [`TunnelConfig`], ...  |
//! | **Errors**        | Typed errors for delivery rounds and parsing.                  | [`NotifyError`], [`ParseTransportProtocolError`] |
//! | **Configuration** | Per-stream buffering.                                          | [`StreamConfig`], [`OverflowPolicy`]        |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use tunnel_events::{ConnectionState, EventNotifier, SubscriberId};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let binding = Arc::new(EventNotifier::<ConnectionState>::new());
//!
//!     // Callback subscriber.
//!     let ui = SubscriberId::generate();
//!     binding.subscribe(ui, |state| println!("binding is now {state}"));
//!
//!     // Stream subscriber, consumed on another task.
//!     let mut stream = binding.open_stream();
//!     let consumer = tokio::spawn(async move { stream.next().await });
//!     while binding.subscriber_count() < 2 {
//!         tokio::task::yield_now().await;
//!     }
//!
//!     binding.notify(ConnectionState::Bound)?;
//!     assert_eq!(consumer.await?, Some(ConnectionState::Bound));
//!
//!     binding.unsubscribe(&ui);
//!     assert!(!binding.has_subscribers());
//!     Ok(())
//! }
//! ```

mod bridge;
mod config;
mod error;
mod events;
mod notifier;
mod subscribers;

// ---- Public re-exports ----

pub use bridge::{BridgeState, EventStream};
pub use config::{OverflowPolicy, StreamConfig};
pub use error::{CallbackFailure, NotifyError, ParseTransportProtocolError};
pub use events::{
    ActionAfterDisconnect, ConnectionState, TransportProtocol, TunnelConfig, TunnelEndpoint,
    TunnelStateTransition, TunnelType,
};
pub use notifier::{EventNotifier, SubscriberId};
pub use subscribers::Subscribe;

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
