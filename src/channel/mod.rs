//! Bounded FIFO channel for direct handoff between tasks.
//!
//! ## Contents
//! - [`BoundedChannel`] — fixed-capacity MPMC channel with blocking and
//!   non-blocking send/receive and one-shot close semantics.
//!
//! ## Quick reference
//! - Capacity `0` → rendezvous: a send completes only when a receiver is
//!   concurrently waiting.
//! - Capacity `n > 0` → up to `n` items buffer before a send blocks.
//! - After [`close`](BoundedChannel::close): sends fail immediately,
//!   receives drain the buffer in FIFO order, then yield `None` forever.

mod bounded;

pub use bounded::BoundedChannel;
