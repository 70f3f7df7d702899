//! Capacity-bounded buffer coordinated by explicit wait conditions.
//!
//! ## Contents
//! - [`ConditionQueue`] — bounded FIFO with not-full / not-empty conditions,
//!   blocking `put`/`take` and non-blocking `try_put`/`try_take`.
//!
//! Unlike [`BoundedChannel`](crate::BoundedChannel) there is no close: a
//! producer/consumer session shuts down by racing an external
//! [`Scope`](crate::Scope) in the [`Mux`](crate::Mux).

mod cond;

pub use cond::ConditionQueue;
