//! Supervisor construction.

use std::sync::Arc;

use crate::config::SupervisorConfig;
use crate::scope::Scope;
use crate::subscribers::Subscribe;

use super::supervisor::Supervisor;

/// Builder for constructing a [`Supervisor`] with optional features.
///
/// ## Example
/// ```rust
/// use taskscope::{Scope, Supervisor, SupervisorConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let (parent, _cancel) = Scope::root().with_cancel();
///     let sup = Supervisor::builder(SupervisorConfig::default())
///         .parent(&parent)
///         .build();
///     assert!(sup.join().await.is_ok());
/// }
/// ```
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    parent: Option<Scope>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            parent: None,
            subscribers: Vec::new(),
        }
    }

    /// Derives the supervisor's root scope from `parent` instead of a fresh
    /// root: the parent's cancellation or deadline stops all workers.
    pub fn parent(mut self, parent: &Scope) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Registers subscribers that receive all supervisor events.
    pub fn with_subscribers(mut self, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subs;
        self
    }

    /// Builds the supervisor. Must be called within a tokio runtime (the
    /// subscriber listener is a spawned task).
    pub fn build(self) -> Supervisor {
        let parent = self.parent.unwrap_or_else(Scope::root);
        Supervisor::assemble(self.cfg, &parent, self.subscribers)
    }
}
