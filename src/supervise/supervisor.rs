//! # Supervisor: spawn workers, cancel their scope, join with first-failure-wins.
//!
//! The [`Supervisor`] owns a root [`Scope`] for its workers, an event
//! [`Bus`], and a [`JoinSet`] of running workers. Each spawned worker gets a
//! child scope of the root, so one [`cancel`](Supervisor::cancel) (or a
//! parent scope's deadline) reaches every worker in one broadcast.
//!
//! ## High-level architecture
//! ```text
//! Supervisor::builder(cfg).parent(&scope).with_subscribers(subs).build()
//!
//! spawn(worker):
//!   child scope = root.with_cancel()
//!   JoinSet.spawn(worker.run(child))        publish WorkerSpawned
//!
//! cancel():
//!   publish SupervisorCancelled
//!   root scope transition ──► broadcast ──► every worker's scope is done
//!
//! join():
//!   drain JoinSet, classify exits:
//!     Ok            → Completed   publish WorkerCompleted
//!     Ok, scope done→ Stopped     publish WorkerStopped
//!     Err(Canceled) → Stopped     publish WorkerStopped
//!     Err(other)    → Failed      publish WorkerFailed  (first error kept)
//!     panic         → Failed      publish WorkerPanicked
//!   publish AllWorkersJoined
//!   return first error (or Ok)
//! ```
//!
//! ## Rules
//! - `join()` aggregates exactly the **first** terminal worker error; later
//!   errors are published on the bus but not re-surfaced.
//! - A graceful scope-driven exit is recorded as stopped, never failed.
//! - With `cfg.grace > 0`, `join()` gives up after the grace window and
//!   reports the still-running workers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinSet;

use crate::config::SupervisorConfig;
use crate::error::{JoinError, WorkerError};
use crate::events::{Bus, Event, EventKind};
use crate::scope::{CancelHandle, Scope};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::builder::SupervisorBuilder;
use super::state::WorkerState;
use super::worker::WorkerRef;

/// One worker's exit record: name, whether its scope was done at exit, and
/// the result it returned.
type Exit = (String, bool, Result<(), WorkerError>);

/// Coordinates worker scopes, event delivery, and join aggregation.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    scope: Scope,
    root_cancel: CancelHandle,
    workers: AsyncMutex<JoinSet<Exit>>,
    states: Mutex<HashMap<String, WorkerState>>,
    // Keeps subscriber queues open for the supervisor's lifetime.
    _subs: Option<Arc<SubscriberSet>>,
}

impl Supervisor {
    /// Creates a supervisor with a fresh root scope and no subscribers.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(cfg: SupervisorConfig) -> Self {
        SupervisorBuilder::new(cfg).build()
    }

    /// Returns a [`SupervisorBuilder`] for the given configuration.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(super) fn assemble(
        cfg: SupervisorConfig,
        parent: &Scope,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let (scope, root_cancel) = parent.with_cancel();

        let subs = if subscribers.is_empty() {
            None
        } else {
            let set = Arc::new(SubscriberSet::new(subscribers));
            Self::subscriber_listener(&bus, &set);
            Some(set)
        };

        Self {
            cfg,
            bus,
            scope,
            root_cancel,
            workers: AsyncMutex::new(JoinSet::new()),
            states: Mutex::new(HashMap::new()),
            _subs: subs,
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn subscriber_listener(bus: &Bus, set: &Arc<SubscriberSet>) {
        let mut rx = bus.subscribe();
        let set = Arc::clone(set);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Launches one worker bound to a child scope of the supervisor's root.
    pub async fn spawn(&self, worker: WorkerRef) {
        let name = worker.name().to_string();
        let (scope, _child_cancel) = self.scope.with_cancel();

        self.states
            .lock()
            .insert(name.clone(), WorkerState::Running);
        self.bus
            .publish(Event::now(EventKind::WorkerSpawned).with_worker(&name));

        let mut set = self.workers.lock().await;
        set.spawn(async move {
            let res = worker.run(scope.clone()).await;
            (name, scope.is_done(), res)
        });
    }

    /// Cancels the supervisor's root scope: every worker's scope becomes
    /// done in one broadcast. Idempotent.
    pub fn cancel(&self) {
        self.bus.publish(Event::now(EventKind::SupervisorCancelled));
        self.root_cancel.cancel();
    }

    /// The root scope workers are bound under.
    pub fn scope(&self) -> Scope {
        self.scope.clone()
    }

    /// The event bus; subscribe to observe lifecycle events directly.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Snapshot of per-worker states, keyed by worker name.
    pub fn states(&self) -> HashMap<String, WorkerState> {
        self.states.lock().clone()
    }

    /// Blocks until all spawned workers reach a terminal state.
    ///
    /// Returns the first non-graceful worker error, or `Ok` when every
    /// worker completed or stopped cleanly. With `cfg.grace > 0`, gives up
    /// after the grace window with
    /// [`JoinError::GraceExceeded`](crate::JoinError::GraceExceeded).
    pub async fn join(&self) -> Result<(), JoinError> {
        let mut set = self.workers.lock().await;

        let res = match self.cfg.grace_window() {
            None => self.drain(&mut set).await,
            Some(grace) => match tokio::time::timeout(grace, self.drain(&mut set)).await {
                Ok(res) => res,
                Err(_elapsed) => {
                    self.bus.publish(Event::now(EventKind::GraceExceeded));
                    return Err(JoinError::GraceExceeded {
                        grace,
                        stuck: self.running_workers(),
                    });
                }
            },
        };

        self.bus.publish(Event::now(EventKind::AllWorkersJoined));
        res
    }

    async fn drain(&self, set: &mut JoinSet<Exit>) -> Result<(), JoinError> {
        let mut first: Option<JoinError> = None;

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, scope_done, Ok(()))) => {
                    let state = if scope_done {
                        WorkerState::Stopped
                    } else {
                        WorkerState::Completed
                    };
                    self.states.lock().insert(name.clone(), state);
                    let kind = if scope_done {
                        EventKind::WorkerStopped
                    } else {
                        EventKind::WorkerCompleted
                    };
                    self.bus.publish(Event::now(kind).with_worker(&name));
                }
                Ok((name, _scope_done, Err(err))) if err.is_graceful() => {
                    self.states.lock().insert(name.clone(), WorkerState::Stopped);
                    self.bus.publish(
                        Event::now(EventKind::WorkerStopped)
                            .with_worker(&name)
                            .with_reason(err.as_message()),
                    );
                }
                Ok((name, _scope_done, Err(err))) => {
                    self.states.lock().insert(name.clone(), WorkerState::Failed);
                    self.bus.publish(
                        Event::now(EventKind::WorkerFailed)
                            .with_worker(&name)
                            .with_reason(err.as_message()),
                    );
                    if first.is_none() {
                        first = Some(JoinError::WorkerFailed {
                            worker: name,
                            source: err,
                        });
                    }
                }
                Err(join_err) => {
                    self.bus.publish(
                        Event::now(EventKind::WorkerPanicked).with_reason(join_err.to_string()),
                    );
                    if first.is_none() {
                        first = Some(JoinError::WorkerPanicked {
                            worker: String::from("unknown"),
                        });
                    }
                }
            }
        }

        first.map_or(Ok(()), Err)
    }

    /// Sorted names of workers still recorded as running.
    fn running_workers(&self) -> Vec<String> {
        let mut stuck: Vec<String> = self
            .states
            .lock()
            .iter()
            .filter(|(_, st)| !st.is_terminal())
            .map(|(name, _)| name.clone())
            .collect();
        stuck.sort_unstable();
        stuck
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CancelCause;
    use crate::mux::{Mux, Outcome};
    use crate::queue::ConditionQueue;
    use crate::supervise::worker::WorkerFn;
    use std::time::Duration;

    fn canceled(scope: &Scope) -> WorkerError {
        WorkerError::Canceled {
            cause: scope.err().unwrap_or(CancelCause::Cancelled),
        }
    }

    #[tokio::test]
    async fn test_join_with_no_workers() {
        let sup = Supervisor::new(SupervisorConfig::default());
        assert!(sup.join().await.is_ok());
    }

    #[tokio::test]
    async fn test_completed_workers_join_ok() {
        let sup = Supervisor::new(SupervisorConfig::default());
        sup.spawn(WorkerFn::arc("a", |_scope: Scope| async { Ok(()) }))
            .await;
        sup.spawn(WorkerFn::arc("b", |_scope: Scope| async { Ok(()) }))
            .await;

        assert!(sup.join().await.is_ok());
        let states = sup.states();
        assert_eq!(states["a"], WorkerState::Completed);
        assert_eq!(states["b"], WorkerState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_wins() {
        let sup = Supervisor::new(SupervisorConfig::default());
        sup.spawn(WorkerFn::arc("early", |_scope: Scope| async {
            Err(WorkerError::Failed {
                reason: "first".into(),
            })
        }))
        .await;
        sup.spawn(WorkerFn::arc("late", |_scope: Scope| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err(WorkerError::Failed {
                reason: "second".into(),
            })
        }))
        .await;

        match sup.join().await {
            Err(JoinError::WorkerFailed { worker, .. }) => assert_eq!(worker, "early"),
            other => panic!("expected first failure, got {other:?}"),
        }
        assert_eq!(sup.states()["late"], WorkerState::Failed);
    }

    #[tokio::test]
    async fn test_cancel_stops_workers_cleanly() {
        let sup = Supervisor::new(SupervisorConfig::default());
        for name in ["w1", "w2", "w3"] {
            sup.spawn(WorkerFn::arc(name, |scope: Scope| async move {
                scope.done().await;
                Err(canceled(&scope))
            }))
            .await;
        }

        sup.cancel();
        assert!(sup.join().await.is_ok());
        for state in sup.states().values() {
            assert_eq!(*state, WorkerState::Stopped);
        }
    }

    #[tokio::test]
    async fn test_ok_exit_after_scope_done_counts_as_stopped() {
        let sup = Supervisor::new(SupervisorConfig::default());
        sup.spawn(WorkerFn::arc("w", |scope: Scope| async move {
            scope.done().await;
            Ok(())
        }))
        .await;

        sup.cancel();
        assert!(sup.join().await.is_ok());
        assert_eq!(sup.states()["w"], WorkerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_grace_exceeded_reports_stuck_workers() {
        let cfg = SupervisorConfig {
            grace: Duration::from_millis(50),
            ..Default::default()
        };
        let sup = Supervisor::new(cfg);
        sup.spawn(WorkerFn::arc("sleeper", |_scope: Scope| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }))
        .await;

        match sup.join().await {
            Err(JoinError::GraceExceeded { stuck, .. }) => {
                assert_eq!(stuck, vec![String::from("sleeper")]);
            }
            other => panic!("expected grace exceeded, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_deadline_propagates_to_workers() {
        let (parent, _h) = Scope::root().with_timeout(Duration::from_millis(100));
        let sup = Supervisor::builder(SupervisorConfig::default())
            .parent(&parent)
            .build();
        sup.spawn(WorkerFn::arc("w", |scope: Scope| async move {
            scope.done().await;
            Err(canceled(&scope))
        }))
        .await;

        assert!(sup.join().await.is_ok());
        assert_eq!(sup.states()["w"], WorkerState::Stopped);
    }

    /// Five workers draining a shared queue under a timeout scope: after the
    /// deadline, join returns promptly with no error and every dequeued item
    /// was fully handled.
    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_timeout_drain() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let (parent, _h) = Scope::root().with_timeout(Duration::from_secs(2));
        let sup = Supervisor::builder(SupervisorConfig::default())
            .parent(&parent)
            .build();

        let total = 64usize;
        let queue = ConditionQueue::new(total);
        let handled = Arc::new(AtomicUsize::new(0));
        for i in 0..total {
            queue.try_put(i).ok();
        }

        for n in 0..5 {
            let queue = queue.clone();
            let handled = handled.clone();
            sup.spawn(WorkerFn::arc(
                format!("drain-{n}"),
                move |scope: Scope| {
                    let queue = queue.clone();
                    let handled = handled.clone();
                    async move {
                        loop {
                            match Mux::new().take(&queue).done(&scope).wait().await {
                                Outcome::Recv { .. } => {
                                    handled.fetch_add(1, Ordering::SeqCst);
                                }
                                Outcome::Done { .. } => return Err(canceled(&scope)),
                                _ => {}
                            }
                        }
                    }
                },
            ))
            .await;
        }

        let started = tokio::time::Instant::now();
        assert!(sup.join().await.is_ok());
        assert!(
            started.elapsed() <= Duration::from_millis(2100),
            "join took {:?}",
            started.elapsed()
        );

        // Every item dequeued before the stop was fully handled.
        assert_eq!(handled.load(Ordering::SeqCst) + queue.len(), total);
        for state in sup.states().values() {
            assert_eq!(*state, WorkerState::Stopped);
        }
    }
}
