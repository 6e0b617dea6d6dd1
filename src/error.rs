//! Error types used by the notifier and the payload parsers.
//!
//! This module defines:
//!
//! - [`NotifyError`]: raised by [`EventNotifier::notify`](crate::EventNotifier::notify)
//!   after a delivery round in which one or more callbacks panicked.
//! - [`ParseTransportProtocolError`]: raised when a string is not a known
//!   [`TransportProtocol`](crate::TransportProtocol).
//!
//! Both provide `as_label` / `as_message` helpers for logs and metrics.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// A single callback that panicked during a delivery round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFailure {
    /// Debug rendering of the subscriber identity.
    pub subscriber: String,
    /// Panic payload, if it was a string.
    pub message: String,
}

impl fmt::Display for CallbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subscriber, self.message)
    }
}

/// # Errors produced by a notification round.
///
/// Returned only after **every** subscriber of the round was attempted;
/// a failing callback never prevents delivery to the others.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum NotifyError {
    /// One or more subscriber callbacks panicked.
    #[error("{} of {attempted} subscriber callbacks panicked", .failures.len())]
    CallbackPanicked {
        /// Number of callbacks invoked in the round.
        attempted: usize,
        /// Callbacks that panicked, in invocation order.
        failures: Vec<CallbackFailure>,
    },
}

impl NotifyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tunnel_events::NotifyError;
    ///
    /// let err = NotifyError::CallbackPanicked { attempted: 2, failures: vec![] };
    /// assert_eq!(err.as_label(), "notify_callback_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            NotifyError::CallbackPanicked { .. } => "notify_callback_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            NotifyError::CallbackPanicked {
                attempted,
                failures,
            } => {
                let list: Vec<String> = failures.iter().map(ToString::to_string).collect();
                format!(
                    "callback panicked in {}/{attempted} subscribers: [{}]",
                    failures.len(),
                    list.join(", ")
                )
            }
        }
    }

    /// Returns the failed callbacks of the round.
    pub fn failures(&self) -> &[CallbackFailure] {
        match self {
            NotifyError::CallbackPanicked { failures, .. } => failures,
        }
    }
}

/// Returned when a string does not name a [`TransportProtocol`](crate::TransportProtocol).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not a valid transport protocol: {input:?}")]
pub struct ParseTransportProtocolError {
    /// The rejected input.
    pub input: String,
}

impl ParseTransportProtocolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        "invalid_transport_protocol"
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
