//! # Stream bridge configuration.
//!
//! Provides [`StreamConfig`], the buffering settings of one
//! [`EventStream`](crate::EventStream).
//!
//! A notifier never waits for a consumer: every stream owns a bounded buffer
//! that absorbs bursts, and [`OverflowPolicy`] decides what is lost once the
//! buffer is full.
//!
//! ## Sentinel values
//! - `capacity = 0` → clamped to 1
//!
//! ## Channels
//! - `DropNewest` uses a `tokio::sync::mpsc` channel of exactly `capacity`
//! - `DropOldest` uses a `tokio::sync::broadcast` channel, which rounds
//!   `capacity` up to the next power of two

/// Which value is discarded when a stream buffer is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Evict the oldest buffered value to make room for the new one.
    ///
    /// The consumer always ends up with the most recent `capacity` values,
    /// which suits state-like payloads where only the latest one matters.
    #[default]
    DropOldest,

    /// Discard the incoming value and keep the buffer untouched.
    ///
    /// The consumer sees a gap-free prefix of the emissions.
    DropNewest,
}

/// Buffering settings for one stream bridge.
///
/// ## Field semantics
/// - `capacity`: maximum number of undelivered values held for the consumer (min 1)
/// - `overflow`: what to discard once `capacity` is reached
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Maximum number of values buffered between `notify` and the consumer.
    pub capacity: usize,

    /// Policy applied when the buffer is full.
    pub overflow: OverflowPolicy,
}

impl StreamConfig {
    /// Returns the buffer capacity clamped to a minimum of 1.
    #[inline]
    pub fn capacity_clamped(&self) -> usize {
        self.capacity.max(1)
    }

    /// Sets the buffer capacity.
    #[inline]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the overflow policy.
    #[inline]
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

impl Default for StreamConfig {
    /// Default configuration:
    ///
    /// - `capacity = 1024`
    /// - `overflow = OverflowPolicy::DropOldest`
    fn default() -> Self {
        Self {
            capacity: 1024,
            overflow: OverflowPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.capacity, 1024);
        assert_eq!(cfg.overflow, OverflowPolicy::DropOldest);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = StreamConfig::default().with_capacity(0);
        assert_eq!(cfg.capacity_clamped(), 1);
    }

    #[test]
    fn test_builders() {
        let cfg = StreamConfig::default()
            .with_capacity(8)
            .with_overflow(OverflowPolicy::DropNewest);
        assert_eq!(cfg.capacity_clamped(), 8);
        assert_eq!(cfg.overflow, OverflowPolicy::DropNewest);
    }
}
