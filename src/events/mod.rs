//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the
//! [`Supervisor`](crate::Supervisor).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: the supervisor (spawn, terminal worker states, cancel,
//!   join completion).
//! - **Consumers**: the supervisor's subscriber listener (fans out to a
//!   [`SubscriberSet`](crate::SubscriberSet)) and any direct
//!   [`Bus::subscribe`] caller.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
