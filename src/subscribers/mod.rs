//! # Object-style subscribers.
//!
//! Closures are the common way to subscribe to an
//! [`EventNotifier`](crate::EventNotifier). This module adds the
//! [`Subscribe`] trait for subscribers that carry state or a name, plus a
//! built-in logger.
//!
//! ## Architecture
//! ```text
//! notify(v) ──► snapshot ──┬──► closure(v)
//!                          ├──► Subscribe::on_event(&v)   (attach)
//!                          └──► LogWriter → tracing::info!  (feature "logging")
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
