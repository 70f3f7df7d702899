//! Multiplexed wait: race several sources, resolve exactly one.
//!
//! ## Contents
//! - [`Mux`] — builder collecting wait-able sources (channel receive, queue
//!   take, timer, scope done) and racing them to a single [`Outcome`].
//! - [`Outcome`] — tagged result identifying which source fired.
//!
//! ## Quick wiring
//! ```text
//! Mux::new()
//!   .recv(&channel)      // source 0: data
//!   .done(&scope)        // source 1: cancellation
//!   .sleep(tick)         // source 2: timer
//!   .wait().await        // exactly one Outcome
//! ```
//!
//! Including a scope's done signal is the idiomatic way to make any blocking
//! wait cancellation-aware: a worker must never block on its work source
//! alone.

mod mux;
mod outcome;

pub use mux::Mux;
pub use outcome::Outcome;
