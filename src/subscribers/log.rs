//! # LogWriter: payload logger
//!
//! A minimal subscriber that writes every notified value through `tracing`
//! at `info` level. Attach one per notifier when you want a trace of the
//! platform events without writing a subscriber.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO tunnel_events::subscribers::log: event topic="binding" event=bound
//! INFO tunnel_events::subscribers::log: event topic="tunnel" event=connected WireGuard - 185.65.134.1:51820/UDP
//! ```

use std::fmt;

use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Debug, Clone, Copy)]
pub struct LogWriter {
    topic: &'static str,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] tagging its records with `topic`.
    #[must_use]
    pub fn new(topic: &'static str) -> Self {
        Self { topic }
    }

    /// Topic attached to every record.
    pub fn topic(&self) -> &'static str {
        self.topic
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new("events")
    }
}

impl<T> Subscribe<T> for LogWriter
where
    T: fmt::Display,
{
    fn on_event(&self, event: &T) {
        tracing::info!(topic = self.topic, event = %event, "event");
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::events::ConnectionState;
    use crate::{EventNotifier, SubscriberId};

    #[test]
    fn test_log_writer_attaches_to_any_display_payload() {
        let notifier = EventNotifier::<ConnectionState>::new();
        let writer = Arc::new(LogWriter::new("binding"));
        notifier.attach(SubscriberId::generate(), writer);

        assert!(notifier.notify(ConnectionState::Bound).is_ok());
        assert_eq!(LogWriter::default().topic(), "events");
        assert_eq!(Subscribe::<ConnectionState>::name(&LogWriter::default()), "log_writer");
    }
}
