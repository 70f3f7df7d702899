//! Error types used across the taskscope primitives.
//!
//! This module centralizes the error taxonomy:
//!
//! - [`CancelCause`] — why a scope left the pending state.
//! - [`SendError`], [`TrySendError`], [`TryRecvError`], [`CloseError`] —
//!   channel operation failures.
//! - [`QueueFullError`] — non-blocking put on a full [`ConditionQueue`](crate::ConditionQueue).
//! - [`WorkerError`] — errors raised by individual worker executions.
//! - [`JoinError`] — errors surfaced by [`Supervisor::join`](crate::Supervisor::join).
//!
//! All of these are returned as values from the respective calls; nothing in
//! this crate signals failure by panicking. Helper methods (`as_label`,
//! `as_message`) are provided for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Why a scope became done.
///
/// Returned by [`Scope::err`](crate::Scope::err) once the scope has left the
/// pending state. The cause is monotonic: whichever transition happens first
/// (explicit cancel or deadline) wins, and the cause never changes afterwards.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    /// The scope (or an ancestor) was explicitly cancelled.
    #[error("scope cancelled")]
    Cancelled,

    /// The scope's deadline (or an ancestor's) elapsed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl CancelCause {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CancelCause::Cancelled => "scope_cancelled",
            CancelCause::DeadlineExceeded => "scope_deadline_exceeded",
        }
    }
}

/// Error returned by [`BoundedChannel::send`](crate::BoundedChannel::send)
/// when the channel is closed. Carries the rejected value back to the caller.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("sending on a closed channel")]
pub struct SendError<T>(pub T);

/// Error returned by [`BoundedChannel::try_send`](crate::BoundedChannel::try_send).
///
/// Both variants carry the rejected value back to the caller.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TrySendError<T> {
    /// The channel is at capacity (or, for a rendezvous channel, no receiver
    /// is currently waiting).
    #[error("channel full")]
    Full(T),

    /// The channel is closed.
    #[error("sending on a closed channel")]
    Closed(T),
}

impl<T> TrySendError<T> {
    /// Consumes the error, returning the value that failed to be sent.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(v) | TrySendError::Closed(v) => v,
        }
    }
}

/// Error returned by [`BoundedChannel::try_recv`](crate::BoundedChannel::try_recv).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// The channel has no buffered items right now, but is not closed.
    #[error("channel empty")]
    Empty,

    /// The channel is closed and fully drained; no value will ever arrive.
    #[error("channel closed and drained")]
    Closed,
}

/// Error returned by [`BoundedChannel::close`](crate::BoundedChannel::close)
/// when the channel was already closed.
///
/// Closing twice is an error while cancelling a scope twice is a no-op; the
/// asymmetry mirrors the underlying semantics (a close transfers "no more
/// data" responsibility exactly once, a cancel is an idempotent broadcast).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("channel already closed")]
pub struct CloseError;

/// Error returned by [`ConditionQueue::try_put`](crate::ConditionQueue::try_put)
/// when the queue is at capacity. Carries the rejected value.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("queue full")]
pub struct QueueFullError<T>(pub T);

/// # Errors produced by worker execution.
///
/// These represent failures of individual workers managed by a
/// [`Supervisor`](crate::Supervisor). [`WorkerError::Canceled`] is a graceful
/// exit (the worker observed its scope become done), not a failure.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Worker execution failed but could be meaningfully retried by the caller.
    #[error("execution failed: {reason}")]
    Failed {
        /// The underlying error message.
        reason: String,
    },

    /// Non-recoverable fatal error.
    #[error("fatal error: {reason}")]
    Fatal {
        /// The underlying error message.
        reason: String,
    },

    /// The worker observed its scope become done and exited cooperatively.
    #[error("scope done: {cause}")]
    Canceled {
        /// Why the scope became done.
        cause: CancelCause,
    },
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Failed { .. } => "worker_failed",
            WorkerError::Fatal { .. } => "worker_fatal",
            WorkerError::Canceled { .. } => "worker_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WorkerError::Failed { reason } => format!("error: {reason}"),
            WorkerError::Fatal { reason } => format!("fatal: {reason}"),
            WorkerError::Canceled { cause } => format!("canceled: {}", cause.as_label()),
        }
    }

    /// Indicates whether this error counts as a graceful stop.
    ///
    /// [`Supervisor::join`](crate::Supervisor::join) treats graceful exits as
    /// stopped workers, not failed ones.
    pub fn is_graceful(&self) -> bool {
        matches!(self, WorkerError::Canceled { .. })
    }
}

/// # Errors surfaced by [`Supervisor::join`](crate::Supervisor::join).
///
/// Join aggregates exactly the **first** terminal worker error; subsequent
/// worker errors are published on the event bus but not re-surfaced.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JoinError {
    /// The first worker that reached a failed terminal state.
    #[error("worker '{worker}' failed: {source}")]
    WorkerFailed {
        /// Name of the failed worker.
        worker: String,
        /// The worker's terminal error.
        #[source]
        source: WorkerError,
    },

    /// A worker panicked instead of returning an error.
    #[error("worker '{worker}' panicked")]
    WorkerPanicked {
        /// Name of the panicked worker, if known.
        worker: String,
    },

    /// The configured join grace window elapsed before all workers reached a
    /// terminal state.
    #[error("join grace {grace:?} exceeded; still running: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of workers that were still running when the window closed.
        stuck: Vec<String>,
    },
}

impl JoinError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            JoinError::WorkerFailed { .. } => "join_worker_failed",
            JoinError::WorkerPanicked { .. } => "join_worker_panicked",
            JoinError::GraceExceeded { .. } => "join_grace_exceeded",
        }
    }
}
