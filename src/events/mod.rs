//! Payloads carried through the notifier.
//!
//! Every type here is an immutable value: subscribers receive their own clone
//! and never share mutable access to a payload.
//!
//! ## Contents
//! - [`ConnectionState`] service binding state (`Bound` / `Unbound`)
//! - [`TunnelEndpoint`], [`TransportProtocol`], [`TunnelType`] remote side of a tunnel
//! - [`TunnelConfig`] addresses, DNS servers, routes and MTU of the tunnel interface
//! - [`TunnelStateTransition`], [`ActionAfterDisconnect`] tunnel lifecycle
//!
//! ## Quick reference
//! - **Publishers**: platform service-connection layer (binding state),
//!   tunnel-management layer (config, endpoints, transitions).
//! - **Consumers**: UI layers, through [`EventNotifier::subscribe`](crate::EventNotifier::subscribe)
//!   or an [`EventStream`](crate::EventStream).

mod connection;
mod tunnel;

pub use connection::ConnectionState;
pub use tunnel::{
    ActionAfterDisconnect, TransportProtocol, TunnelConfig, TunnelEndpoint, TunnelStateTransition,
    TunnelType,
};
