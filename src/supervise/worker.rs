//! # Worker abstraction and function-backed implementation.
//!
//! A [`Worker`] receives a [`Scope`] and must race `scope.done()` (via the
//! [`Mux`](crate::Mux)) at **every** blocking point — never blocking on a
//! work source alone — so cancellation is observed promptly. On observing
//! done, a worker drains or requeues in-flight items before returning.
//!
//! The common handle type is [`WorkerRef`], an `Arc<dyn Worker>` suitable
//! for sharing across the runtime.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WorkerError;
use crate::scope::Scope;

/// # Asynchronous, scope-bound unit of work.
///
/// ## Example
/// ```rust
/// use async_trait::async_trait;
/// use taskscope::{CancelCause, Scope, Worker, WorkerError};
///
/// struct Drainer;
///
/// #[async_trait]
/// impl Worker for Drainer {
///     fn name(&self) -> &str { "drainer" }
///
///     async fn run(&self, scope: Scope) -> Result<(), WorkerError> {
///         scope.done().await;
///         Err(WorkerError::Canceled {
///             cause: scope.err().unwrap_or(CancelCause::Cancelled),
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Returns a stable, human-readable worker name.
    ///
    /// Names should be unique within one supervisor; state tracking is
    /// keyed by name.
    fn name(&self) -> &str;

    /// Executes the worker until completion or cancellation.
    ///
    /// Returning `Err(WorkerError::Canceled { .. })` marks a graceful,
    /// scope-driven exit; the supervisor records it as stopped, not failed.
    async fn run(&self, scope: Scope) -> Result<(), WorkerError>;
}

/// Shared reference to a worker.
pub type WorkerRef = Arc<dyn Worker>;

/// Function-backed worker implementation.
///
/// Wraps a closure that *creates* a new future per run, so there is no
/// hidden shared state between executions; share state explicitly with
/// `Arc<...>` inside the closure when needed.
///
/// ## Example
/// ```rust
/// use taskscope::{Scope, WorkerError, WorkerFn, WorkerRef};
///
/// let w: WorkerRef = WorkerFn::arc("hello", |scope: Scope| async move {
///     if scope.is_done() {
///         return Ok(());
///     }
///     // do work...
///     Ok::<_, WorkerError>(())
/// });
/// assert_eq!(w.name(), "hello");
/// ```
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    ///
    /// Prefer [`WorkerFn::arc`] when you immediately need a [`WorkerRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn(Scope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, scope: Scope) -> Result<(), WorkerError> {
        (self.f)(scope).await
    }
}
