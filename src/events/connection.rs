//! Service connection binding state.
//!
//! The platform service-connection layer calls
//! [`EventNotifier::notify`](crate::EventNotifier::notify) with
//! [`ConnectionState::Bound`] / [`ConnectionState::Unbound`] as the client
//! attaches to and detaches from the background service.
//!
//! ```text
//! Unbound (initial) ──bind──► Bound ──unbind──► Unbound ──► ...
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the client is currently attached to the background service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Attached to the service.
    Bound,
    /// Not attached. Initial state.
    #[default]
    Unbound,
}

impl ConnectionState {
    #[inline]
    pub fn is_bound(&self) -> bool {
        matches!(self, ConnectionState::Bound)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Bound => f.write_str("bound"),
            ConnectionState::Unbound => f.write_str("unbound"),
        }
    }
}
