//! Process-unique subscriber identities.
//!
//! [`SubscriberId`] is the default key of an [`EventNotifier`](crate::EventNotifier)
//! and the identity every [`EventStream`](crate::EventStream) subscribes under.
//! Values come from a global monotonic counter, so two calls to
//! [`SubscriberId::generate`] never collide within a process. Identities picked by
//! hand (e.g. `SubscriberId::from(1)`) are not tracked by the counter; keeping
//! them apart from generated ones is the caller's job.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global counter for generated identities.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque subscriber identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Returns a fresh identity.
    pub fn generate() -> Self {
        Self(NEXT_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw numeric value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for SubscriberId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Lets string-keyed notifiers host stream bridges.
impl From<SubscriberId> for String {
    fn from(id: SubscriberId) -> Self {
        id.to_string()
    }
}
