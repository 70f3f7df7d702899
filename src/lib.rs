//! # taskscope
//!
//! **Taskscope** is a structured cancellation and coordination library for
//! async Rust.
//!
//! It provides a hierarchical cancellation scope (deadlines, values, and
//! broadcast cancellation over a derivation tree), bounded and rendezvous
//! channels, a condition-style queue, a multi-source wait (`Mux`), and a
//! worker supervisor that ties them together. The crate is designed as a
//! building block for pipelines and services that must stop promptly and
//! cleanly.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                       Scope::root()
//!                            │
//!            ┌───────────────┼───────────────┐
//!            ▼               ▼               ▼
//!      with_cancel()   with_timeout(d)  with_value(k, v)
//!            │               │               │
//!            ▼               ▼               ▼
//!         Scope           Scope            Scope          (derivation tree;
//!            │               │                             cancelling a node
//!            ▼               ▼                             reaches its whole
//!        children…       children…                         subtree)
//!
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - root Scope (child of an optional parent scope)                 │
//! │  - Bus (broadcast lifecycle events)                               │
//! │  - JoinSet of workers, per-worker state map                       │
//! │  - SubscriberSet (fans out events to user subscribers)            │
//! └──────┬──────────────────────┬──────────────────────┬──────────────┘
//!        ▼                      ▼                      ▼
//!   Worker::run(scope)     Worker::run(scope)     Worker::run(scope)
//!        │                      │                      │
//!        │   every blocking point races scope.done():  │
//!        ▼                      ▼                      ▼
//!   Mux::new()             Mux::new()             Mux::new()
//!     .recv(&channel)        .take(&queue)          .sleep(interval)
//!     .done(&scope)          .done(&scope)          .done(&scope)
//!     .wait()                .wait()                .wait()
//! ```
//!
//! ### Cancellation flow
//! ```text
//! cancel() / deadline fires / Supervisor::cancel()
//!   │
//!   ├─► scope transitions to done exactly once (cause recorded)
//!   ├─► broadcast: every descendant scope transitions too
//!   │
//!   └─► workers racing done() observe it at their next blocking point:
//!         ├─ drain or requeue in-flight items
//!         └─ return Err(WorkerError::Canceled { cause })   (graceful)
//!
//! join() classifies exits:
//!   Ok (scope live) ─► Completed      Err(Canceled)  ─► Stopped
//!   Ok (scope done) ─► Stopped        Err(other)     ─► Failed
//!   panic           ─► Failed         first error wins
//! ```
//!
//! ## Features
//! | Area              | Description                                                          | Key types / traits                    |
//! |-------------------|----------------------------------------------------------------------|---------------------------------------|
//! | **Scopes**        | Hierarchical cancellation with deadlines and request-scoped values.  | [`Scope`], [`CancelHandle`]           |
//! | **Channels**      | Bounded buffered and rendezvous (capacity 0) hand-off.               | [`BoundedChannel`]                    |
//! | **Queues**        | Blocking put/take over a bounded buffer.                             | [`ConditionQueue`]                    |
//! | **Multiplexing**  | Race channels, queues, timers, and scopes to one outcome.            | [`Mux`], [`Outcome`]                  |
//! | **Supervision**   | Spawn, cancel, and join scope-bound workers.                         | [`Supervisor`], [`Worker`]            |
//! | **Subscriber API**| Hook into worker lifecycle events (logging, metrics, custom).        | [`Subscribe`]                         |
//! | **Errors**        | Typed errors for scopes, channels, workers, and joins.               | [`CancelCause`], [`WorkerError`]      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskscope::{
//!     CancelCause, ConditionQueue, Mux, Outcome, Scope, Supervisor, SupervisorConfig,
//!     WorkerError, WorkerFn,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // Everything under this scope stops when the deadline fires.
//!     let (parent, _cancel) = Scope::root().with_timeout(Duration::from_millis(200));
//!
//!     let sup = Supervisor::builder(SupervisorConfig::default())
//!         .parent(&parent)
//!         .build();
//!
//!     let queue = ConditionQueue::new(8);
//!     for i in 0..4 {
//!         queue.try_put(i).ok();
//!     }
//!
//!     let q = queue.clone();
//!     sup.spawn(WorkerFn::arc("drain", move |scope: Scope| {
//!         let q = q.clone();
//!         async move {
//!             loop {
//!                 match Mux::new().take(&q).done(&scope).wait().await {
//!                     Outcome::Recv { value: Some(item), .. } => {
//!                         println!("processed {item}");
//!                     }
//!                     Outcome::Done { cause, .. } => {
//!                         return Err(WorkerError::Canceled { cause });
//!                     }
//!                     _ => {}
//!                 }
//!             }
//!         }
//!     }))
//!     .await;
//!
//!     // Queue drained, deadline fires, worker stops, join returns clean.
//!     assert!(sup.join().await.is_ok());
//!     assert_eq!(parent.err(), Some(CancelCause::DeadlineExceeded));
//! }
//! ```

mod channel;
mod config;
mod error;
mod events;
mod mux;
mod queue;
mod scope;
mod subscribers;
mod supervise;

// ---- Public re-exports ----

pub use channel::BoundedChannel;
pub use config::SupervisorConfig;
pub use error::{
    CancelCause, CloseError, JoinError, QueueFullError, SendError, TryRecvError, TrySendError,
    WorkerError,
};
pub use events::{Bus, Event, EventKind};
pub use mux::{Mux, Outcome};
pub use queue::ConditionQueue;
pub use scope::{CancelHandle, Scope};
pub use subscribers::{Subscribe, SubscriberSet};
pub use supervise::{Supervisor, SupervisorBuilder, Worker, WorkerFn, WorkerRef, WorkerState};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
