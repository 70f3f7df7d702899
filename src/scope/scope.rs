//! # Scope: a node in the cancellation tree.
//!
//! A [`Scope`] is a cheap cloneable handle to a shared node. Children are
//! derived with [`Scope::with_cancel`], [`Scope::with_timeout`],
//! [`Scope::with_deadline`], and [`Scope::with_value`]; cancellation flows
//! strictly downward.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskscope::{CancelCause, Scope};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let root = Scope::root();
//!     let (scope, cancel) = root.with_cancel();
//!
//!     let worker = scope.clone();
//!     let handle = tokio::spawn(async move {
//!         worker.done().await;
//!         worker.err()
//!     });
//!
//!     cancel.cancel();
//!     assert_eq!(handle.await.unwrap(), Some(CancelCause::Cancelled));
//! }
//! ```

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::WaitForCancellationFuture;

use super::inner::{arm_deadline, register_child, transition, Inner};
use crate::error::CancelCause;

/// Handle to a node in the cancellation tree.
///
/// Cloning is cheap and clones observe the same node. A scope becomes done
/// exactly once — by an explicit [`CancelHandle::cancel`], by its deadline
/// elapsing, or by an ancestor's transition — and every query afterwards is
/// idempotent.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<Inner>,
}

/// Cancels the scope it was derived with.
///
/// Calling [`cancel`](CancelHandle::cancel) more than once is a no-op after
/// the first call. Dropping the handle does **not** cancel the scope; a
/// timeout scope still expires on its own.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

impl CancelHandle {
    /// Transitions the scope (and transitively its live descendants) to done
    /// with cause [`CancelCause::Cancelled`]. Idempotent.
    pub fn cancel(&self) {
        transition(&self.inner, CancelCause::Cancelled);
    }
}

impl Scope {
    /// Creates a root scope: no parent, pending, no deadline, no bindings.
    pub fn root() -> Self {
        Self {
            inner: Inner::new(None, None, None),
        }
    }

    /// Derives a cancellable child.
    ///
    /// The child inherits the parent's effective deadline and becomes done
    /// when the parent does, when its deadline elapses, or when the returned
    /// handle is cancelled — whichever happens first.
    pub fn with_cancel(&self) -> (Scope, CancelHandle) {
        let child = self.derive(self.inner.deadline, None);
        let handle = CancelHandle {
            inner: child.inner.clone(),
        };
        (child, handle)
    }

    /// Derives a child that expires `timeout` from now.
    ///
    /// Equivalent to [`with_deadline`](Scope::with_deadline) at
    /// `Instant::now() + timeout`. Requires a tokio runtime (the deadline
    /// timer is a spawned task).
    pub fn with_timeout(&self, timeout: Duration) -> (Scope, CancelHandle) {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a child that expires at `deadline` with cause
    /// [`CancelCause::DeadlineExceeded`], unless cancelled first.
    ///
    /// The effective deadline is the minimum over the parent chain: a parent
    /// that expires earlier wins. A deadline already in the past yields a
    /// child that is expired on return. Requires a tokio runtime.
    pub fn with_deadline(&self, deadline: Instant) -> (Scope, CancelHandle) {
        let effective = match self.inner.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        };
        let child = self.derive(Some(effective), None);
        if child.err().is_none() {
            arm_deadline(&child.inner, effective);
        }
        let handle = CancelHandle {
            inner: child.inner.clone(),
        };
        (child, handle)
    }

    /// Derives a child carrying one additional binding.
    ///
    /// Lookup on the child checks its own binding first, then delegates to
    /// the parent chain; a child binding shadows a parent binding for the
    /// same key. Bindings are immutable after creation.
    pub fn with_value<V: Any + Send + Sync>(&self, key: &'static str, value: V) -> Scope {
        self.derive(self.inner.deadline, Some((key, Arc::new(value) as _)))
    }

    /// The done signal: resolves exactly once, when the scope leaves the
    /// pending state. Usable as a [`Mux`](crate::Mux) source.
    pub fn done(&self) -> WaitForCancellationFuture<'_> {
        self.inner.token.cancelled()
    }

    /// Returns `true` once the scope has left the pending state.
    pub fn is_done(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// `None` while pending; afterwards the cause, which never changes.
    pub fn err(&self) -> Option<CancelCause> {
        self.inner.state.lock().done
    }

    /// The effective deadline, if any ancestor (or this scope) carries one.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Looks up a binding by key, walking up the parent chain.
    ///
    /// Returns `None` when no ancestor bound the key, or when the bound
    /// value is of a different type than `V`.
    pub fn value<V: Any + Send + Sync>(&self, key: &'static str) -> Option<Arc<V>> {
        let mut node = Some(&self.inner);
        while let Some(cur) = node {
            if let Some((bound, value)) = &cur.binding {
                if *bound == key {
                    return value.clone().downcast::<V>().ok();
                }
            }
            node = cur.parent.as_ref();
        }
        None
    }

    fn derive(
        &self,
        deadline: Option<Instant>,
        binding: Option<(&'static str, Arc<dyn Any + Send + Sync>)>,
    ) -> Scope {
        let inner = Inner::new(Some(self.inner.clone()), deadline, binding);
        register_child(&self.inner, &inner);
        Scope { inner }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("done", &self.err())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_is_pending() {
        let root = Scope::root();
        assert!(!root.is_done());
        assert_eq!(root.err(), None);
        assert_eq!(root.deadline(), None);
    }

    #[tokio::test]
    async fn test_cancel_sets_cause() {
        let (scope, cancel) = Scope::root().with_cancel();
        cancel.cancel();
        assert!(scope.is_done());
        assert_eq!(scope.err(), Some(CancelCause::Cancelled));
    }

    #[tokio::test]
    async fn test_double_cancel_is_noop() {
        let (scope, cancel) = Scope::root().with_cancel();
        cancel.cancel();
        cancel.cancel();
        assert_eq!(scope.err(), Some(CancelCause::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_err_is_monotonic_across_deadline() {
        // Cancel first, then let the deadline elapse: the cause must not change.
        let (scope, cancel) = Scope::root().with_timeout(Duration::from_millis(50));
        cancel.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(scope.err(), Some(CancelCause::Cancelled));
    }

    #[tokio::test]
    async fn test_propagation_is_synchronous() {
        let (a, cancel) = Scope::root().with_cancel();
        let (b, _hb) = a.with_cancel();
        let (c, _hc) = b.with_cancel();

        cancel.cancel();
        // No awaits in between: the broadcast happens during the transition.
        assert!(a.is_done());
        assert!(b.is_done());
        assert!(c.is_done());
        assert_eq!(c.err(), Some(CancelCause::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_propagation_fires_done_within_bound() {
        let (a, cancel) = Scope::root().with_cancel();
        let (b, _hb) = a.with_cancel();
        let (c, _hc) = b.with_cancel();

        cancel.cancel();
        let budget = Duration::from_millis(50);
        for scope in [&a, &b, &c] {
            tokio::time::timeout(budget, scope.done())
                .await
                .expect("done signal must fire within the budget");
        }
    }

    #[tokio::test]
    async fn test_child_of_done_parent_is_done() {
        let (parent, cancel) = Scope::root().with_cancel();
        cancel.cancel();

        let (child, _h) = parent.with_cancel();
        assert!(child.is_done());
        assert_eq!(child.err(), Some(CancelCause::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_expires_with_deadline_cause() {
        let (scope, _cancel) = Scope::root().with_timeout(Duration::from_millis(100));
        scope.done().await;
        assert_eq!(scope.err(), Some(CancelCause::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_beats_deadline() {
        let (scope, cancel) = Scope::root().with_timeout(Duration::from_secs(1));
        cancel.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(scope.err(), Some(CancelCause::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_deadline_clamped_to_parent() {
        let (parent, _hp) = Scope::root().with_timeout(Duration::from_millis(100));
        let (child, _hc) = parent.with_timeout(Duration::from_secs(10));

        assert_eq!(child.deadline(), parent.deadline());
        child.done().await;
        assert_eq!(child.err(), Some(CancelCause::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_in_past_expires_immediately() {
        let (scope, _h) = Scope::root().with_deadline(Instant::now() - Duration::from_secs(1));
        assert!(scope.is_done());
        assert_eq!(scope.err(), Some(CancelCause::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_expiry_propagates_to_cancel_child() {
        let (parent, _hp) = Scope::root().with_timeout(Duration::from_millis(50));
        let (child, _hc) = parent.with_cancel();

        child.done().await;
        assert_eq!(child.err(), Some(CancelCause::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_value_lookup_falls_through_parents() {
        let root = Scope::root();
        let a = root.with_value("user", String::from("alice"));
        let (b, _h) = a.with_cancel();

        assert_eq!(b.value::<String>("user").unwrap().as_str(), "alice");
        assert!(b.value::<String>("missing").is_none());
    }

    #[tokio::test]
    async fn test_child_binding_shadows_parent() {
        let root = Scope::root();
        let a = root.with_value("id", 1u64);
        let b = a.with_value("id", 2u64);

        assert_eq!(a.value::<u64>("id").as_deref(), Some(&1));
        assert_eq!(b.value::<u64>("id").as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn test_value_with_wrong_type_is_none() {
        let scope = Scope::root().with_value("id", 1u64);
        assert!(scope.value::<String>("id").is_none());
    }

    #[tokio::test]
    async fn test_done_scope_still_answers_queries() {
        let scope = Scope::root().with_value("k", 7u32);
        let (child, cancel) = scope.with_cancel();
        cancel.cancel();

        assert_eq!(child.value::<u32>("k").as_deref(), Some(&7));
        assert_eq!(child.err(), Some(CancelCause::Cancelled));
        assert!(child.is_done());
    }
}
