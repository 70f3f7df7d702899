//! Shared scope node state and the transition/broadcast machinery.
//!
//! Each scope owns an independent [`CancellationToken`] that serves as its
//! one-shot done signal. The tree, the cause, the deadline timer, and the
//! value bindings are maintained here; the token is only ever cancelled by
//! [`transition`], exactly once.
//!
//! Lock ordering: [`transition`] takes the node's own lock, releases it,
//! then recurses into children. [`register_child`] takes only the parent's
//! lock. No path acquires a child lock before a parent lock, so the
//! tree-edge order is acyclic.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::CancelCause;

/// Shared state of one scope node.
///
/// The child→parent edge is strong and the parent→child edge is weak: no
/// cycle forms, a dropped leaf frees itself, and a live leaf keeps its
/// ancestors reachable for value lookup and downward broadcast.
pub(crate) struct Inner {
    /// Back-reference for value/deadline lookup and broadcast reachability.
    pub(crate) parent: Option<Arc<Inner>>,
    /// One-shot done signal; cancelled exactly once by [`transition`].
    pub(crate) token: CancellationToken,
    /// Effective deadline (already min-merged with the parent chain).
    pub(crate) deadline: Option<Instant>,
    /// Single binding added by `with_value`; lookup falls through to parent.
    pub(crate) binding: Option<(&'static str, Arc<dyn Any + Send + Sync>)>,
    /// Mutable state: done cause and live child registrations.
    pub(crate) state: Mutex<State>,
}

pub(crate) struct State {
    /// `None` while pending; set exactly once.
    pub(crate) done: Option<CancelCause>,
    /// Weak registrations to children; pruned opportunistically.
    pub(crate) children: Vec<std::sync::Weak<Inner>>,
}

impl Inner {
    pub(crate) fn new(
        parent: Option<Arc<Inner>>,
        deadline: Option<Instant>,
        binding: Option<(&'static str, Arc<dyn Any + Send + Sync>)>,
    ) -> Arc<Self> {
        Arc::new(Self {
            parent,
            token: CancellationToken::new(),
            deadline,
            binding,
            state: Mutex::new(State {
                done: None,
                children: Vec::new(),
            }),
        })
    }
}

/// Moves `node` (and transitively its live descendants) to the done state.
///
/// The first transition wins; later calls are no-ops. The node's own lock is
/// released before the token fires and before children are visited, so `err()`
/// observes the cause no later than `done()` resolves.
pub(crate) fn transition(node: &Arc<Inner>, cause: CancelCause) {
    let children = {
        let mut st = node.state.lock();
        if st.done.is_some() {
            return;
        }
        st.done = Some(cause);
        std::mem::take(&mut st.children)
    };

    // Fire the done signal, then broadcast downward. The deadline timer (if
    // any) races this token and exits promptly.
    node.token.cancel();
    for child in children {
        if let Some(child) = child.upgrade() {
            transition(&child, cause);
        }
    }
}

/// Registers `child` under `parent`, or transitions it immediately when the
/// parent is already done.
///
/// Dead registrations (dropped children) are pruned here, on each derive, so
/// the child set stays proportional to the number of live children.
pub(crate) fn register_child(parent: &Arc<Inner>, child: &Arc<Inner>) {
    let already_done = {
        let mut st = parent.state.lock();
        match st.done {
            Some(cause) => Some(cause),
            None => {
                st.children.retain(|w| w.strong_count() > 0);
                st.children.push(Arc::downgrade(child));
                None
            }
        }
    };
    if let Some(cause) = already_done {
        transition(child, cause);
    }
}

/// Arms the deadline timer for a freshly created scope.
///
/// An elapsed deadline transitions the scope to `DeadlineExceeded` unless it
/// was cancelled first. The timer holds only a weak reference, so it never
/// keeps a dropped scope alive, and it races the scope's own done signal so
/// it is released synchronously on any earlier transition.
pub(crate) fn arm_deadline(node: &Arc<Inner>, at: Instant) {
    if at <= Instant::now() {
        transition(node, CancelCause::DeadlineExceeded);
        return;
    }
    let weak = Arc::downgrade(node);
    let token = node.token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep_until(at) => {
                if let Some(node) = weak.upgrade() {
                    transition(&node, CancelCause::DeadlineExceeded);
                }
            }
            _ = token.cancelled() => {}
        }
    });
}
