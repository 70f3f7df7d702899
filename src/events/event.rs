//! # Lifecycle events emitted by the supervisor.
//!
//! [`EventKind`] classifies events across worker lifecycle and supervisor
//! control flow; [`Event`] carries the metadata (timestamp, worker name,
//! reason).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order across subscribers.
//!
//! ## Example
//! ```rust
//! use taskscope::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::WorkerFailed)
//!     .with_worker("ingest")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::WorkerFailed);
//! assert_eq!(ev.worker.as_deref(), Some("ingest"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A worker was spawned under the supervisor's scope.
    ///
    /// Sets: `worker`, `at`, `seq`.
    WorkerSpawned,

    /// A worker finished its work and exited normally.
    ///
    /// Sets: `worker`, `at`, `seq`.
    WorkerCompleted,

    /// A worker observed its scope become done and exited cooperatively.
    ///
    /// Sets: `worker`, `reason` (cancel cause label), `at`, `seq`.
    WorkerStopped,

    /// A worker exited with an error.
    ///
    /// Sets: `worker`, `reason` (error message), `at`, `seq`.
    WorkerFailed,

    /// A worker panicked; surfaced by `join()`.
    ///
    /// Sets: `worker` (when known), `at`, `seq`.
    WorkerPanicked,

    /// The supervisor's root scope was cancelled via
    /// [`Supervisor::cancel`](crate::Supervisor::cancel).
    ///
    /// Sets: `at`, `seq`.
    SupervisorCancelled,

    /// Every spawned worker reached a terminal state and `join()` returned.
    ///
    /// Sets: `at`, `seq`.
    AllWorkersJoined,

    /// The join grace window elapsed with workers still running.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,
}

/// Supervisor event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `worker`/`reason` are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Event classification.
    pub kind: EventKind,
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Name of the worker, if applicable.
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (error message, cancel cause).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event stamped with the current time and the next sequence
    /// number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            seq: EVENT_SEQ.fetch_add(1, Ordering::Relaxed),
            at: SystemTime::now(),
            worker: None,
            reason: None,
        }
    }

    /// Attaches a worker name.
    pub fn with_worker(mut self, worker: impl AsRef<str>) -> Self {
        self.worker = Some(Arc::from(worker.as_ref()));
        self
    }

    /// Attaches a reason string.
    pub fn with_reason(mut self, reason: impl AsRef<str>) -> Self {
        self.reason = Some(Arc::from(reason.as_ref()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::WorkerSpawned);
        let b = Event::now(EventKind::WorkerSpawned);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_attach_metadata() {
        let ev = Event::now(EventKind::WorkerFailed)
            .with_worker("w1")
            .with_reason("boom");
        assert_eq!(ev.worker.as_deref(), Some("w1"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
