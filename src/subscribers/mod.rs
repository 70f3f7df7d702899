//! Subscriber API: hook into supervisor lifecycle events.
//!
//! ## Contents
//! - [`Subscribe`] — the extension-point trait for event handlers
//! - [`SubscriberSet`] — non-blocking fan-out with per-subscriber queues
//! - `LogWriter` — a simple stderr subscriber (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
