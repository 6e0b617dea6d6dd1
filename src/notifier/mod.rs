//! # Keyed observer registry and broadcaster.
//!
//! - [`EventNotifier`] maps subscriber identities to callbacks and fans out
//!   every notified value to a snapshot of them.
//! - [`SubscriberId`] is the process-unique identity used when the caller does
//!   not bring its own key (streams always use one).
//! - `SubscriberRegistry` is the plain map the notifier guards (crate-private).

mod id;
#[allow(clippy::module_inception)]
mod notifier;
mod registry;

pub use id::SubscriberId;
pub use notifier::EventNotifier;
pub(crate) use registry::Callback;
