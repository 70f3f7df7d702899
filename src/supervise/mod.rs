//! Worker supervision: spawn, cancel, join.
//!
//! This module composes the other primitives: a [`Supervisor`] owns a root
//! [`Scope`](crate::Scope), spawns [`Worker`]s bound to child scopes, and
//! joins them with first-failure-wins error aggregation.
//!
//! Internal modules:
//! - [`worker`]: the `Worker` trait and the closure-backed `WorkerFn`;
//! - [`state`]: per-worker terminal state tracking;
//! - [`builder`]: supervisor construction with optional parent scope and
//!   subscribers;
//! - [`supervisor`]: spawn/cancel/join orchestration and event publishing.

mod builder;
mod state;
mod supervisor;
mod worker;

pub use builder::SupervisorBuilder;
pub use state::WorkerState;
pub use supervisor::Supervisor;
pub use worker::{Worker, WorkerFn, WorkerRef};
