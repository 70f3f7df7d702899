//! # Mux: race wait-able sources to exactly one outcome.
//!
//! The builder collects sources in registration order; [`Mux::wait`] races
//! them and resolves the first that becomes ready. When several sources are
//! ready at once, the winner is chosen by a rotating poll offset taken from
//! a global counter, so across repeated waits a ready source is never
//! skipped more than `len` consecutive times (bounded-skip fairness, no
//! strict fairness guarantee).
//!
//! ## Rules
//! - Losing data sources consume nothing: a receive or take only removes an
//!   item in the same poll that returns it.
//! - [`Mux::with_default`] makes the wait non-blocking: one readiness pass,
//!   then [`Outcome::Default`] if nothing fired.
//! - A mux with no sources and no default waits forever.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::time::Instant;

use super::outcome::Outcome;
use crate::channel::BoundedChannel;
use crate::error::CancelCause;
use crate::queue::ConditionQueue;
use crate::scope::Scope;

/// Rotating first-poll position shared by all waits in the process.
static ROTATION: AtomicUsize = AtomicUsize::new(0);

type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Outcome<T>> + Send + 'a>>;

/// Builder racing multiple wait-able sources; see the [module docs](self).
///
/// ## Example
/// ```rust
/// use taskscope::{BoundedChannel, Mux, Outcome, Scope};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let ch = BoundedChannel::new(1);
///     let (scope, cancel) = Scope::root().with_cancel();
///     ch.send(5).await.unwrap();
///
///     match Mux::new().recv(&ch).done(&scope).wait().await {
///         Outcome::Recv { value: Some(v), .. } => assert_eq!(v, 5),
///         other => panic!("unexpected outcome: {other:?}"),
///     }
///     cancel.cancel();
/// }
/// ```
pub struct Mux<'a, T = ()> {
    sources: Vec<SourceFuture<'a, T>>,
    default_case: bool,
}

impl<'a, T: Send + 'a> Mux<'a, T> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            default_case: false,
        }
    }

    /// Adds a channel-receive source.
    ///
    /// Fires with [`Outcome::Recv`]; `value` is `None` once the channel is
    /// closed and drained.
    pub fn recv(mut self, channel: &'a BoundedChannel<T>) -> Self {
        let source = self.sources.len();
        self.sources.push(Box::pin(async move {
            Outcome::Recv {
                source,
                value: channel.recv().await,
            }
        }));
        self
    }

    /// Adds a queue-take source; fires with [`Outcome::Recv`].
    pub fn take(mut self, queue: &'a ConditionQueue<T>) -> Self {
        let source = self.sources.len();
        self.sources.push(Box::pin(async move {
            Outcome::Recv {
                source,
                value: Some(queue.take().await),
            }
        }));
        self
    }

    /// Adds a timer source that fires after `duration`.
    pub fn sleep(mut self, duration: Duration) -> Self {
        let source = self.sources.len();
        self.sources.push(Box::pin(async move {
            tokio::time::sleep(duration).await;
            Outcome::Elapsed { source }
        }));
        self
    }

    /// Adds a timer source that fires at `deadline`.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        let source = self.sources.len();
        self.sources.push(Box::pin(async move {
            tokio::time::sleep_until(deadline).await;
            Outcome::Elapsed { source }
        }));
        self
    }

    /// Adds a scope's done signal as a source; fires with [`Outcome::Done`].
    pub fn done(mut self, scope: &'a Scope) -> Self {
        let source = self.sources.len();
        self.sources.push(Box::pin(async move {
            scope.done().await;
            Outcome::Done {
                source,
                cause: scope.err().unwrap_or(CancelCause::Cancelled),
            }
        }));
        self
    }

    /// Makes the wait non-blocking: if no source is ready on the first
    /// readiness pass, resolve [`Outcome::Default`] immediately.
    pub fn with_default(mut self) -> Self {
        self.default_case = true;
        self
    }

    /// Races the registered sources and resolves exactly one outcome.
    pub async fn wait(self) -> Outcome<T> {
        let len = self.sources.len().max(1);
        Race {
            sources: self.sources,
            default_case: self.default_case,
            offset: ROTATION.fetch_add(1, Ordering::Relaxed) % len,
        }
        .await
    }
}

impl<'a, T: Send + 'a> Default for Mux<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

struct Race<'a, T> {
    sources: Vec<SourceFuture<'a, T>>,
    default_case: bool,
    offset: usize,
}

impl<'a, T> Future for Race<'a, T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let len = this.sources.len();

        for i in 0..len {
            let idx = (this.offset + i) % len;
            if let Poll::Ready(outcome) = this.sources[idx].as_mut().poll(cx) {
                return Poll::Ready(outcome);
            }
        }
        if this.default_case {
            return Poll::Ready(Outcome::Default);
        }
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_when_nothing_ready() {
        let ch = BoundedChannel::<u32>::new(1);
        let outcome = Mux::new().recv(&ch).with_default().wait().await;
        assert_eq!(outcome, Outcome::Default);
    }

    #[tokio::test]
    async fn test_recv_source_wins() {
        let ch = BoundedChannel::new(1);
        ch.send(5).await.unwrap();
        let (scope, _cancel) = Scope::root().with_cancel();

        let outcome = Mux::new().recv(&ch).done(&scope).wait().await;
        assert_eq!(
            outcome,
            Outcome::Recv {
                source: 0,
                value: Some(5)
            }
        );
    }

    #[tokio::test]
    async fn test_closed_drained_channel_reports_no_value() {
        let ch = BoundedChannel::<u32>::new(1);
        ch.close().unwrap();
        let outcome = Mux::new().recv(&ch).wait().await;
        assert_eq!(
            outcome,
            Outcome::Recv {
                source: 0,
                value: None
            }
        );
    }

    #[tokio::test]
    async fn test_take_source_wins() {
        let q = ConditionQueue::new(1);
        q.put(7).await;
        let outcome = Mux::new().take(&q).with_default().wait().await;
        assert_eq!(
            outcome,
            Outcome::Recv {
                source: 0,
                value: Some(7)
            }
        );
    }

    #[tokio::test]
    async fn test_done_source_carries_cause() {
        let (scope, cancel) = Scope::root().with_cancel();
        cancel.cancel();

        let ch = BoundedChannel::<u32>::new(1);
        let outcome = Mux::new().recv(&ch).done(&scope).wait().await;
        assert_eq!(
            outcome,
            Outcome::Done {
                source: 1,
                cause: CancelCause::Cancelled
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_source_elapses() {
        let ch = BoundedChannel::<u32>::new(1);
        let outcome = Mux::new()
            .recv(&ch)
            .sleep(Duration::from_millis(20))
            .wait()
            .await;
        assert_eq!(outcome, Outcome::Elapsed { source: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_beats_blocked_take() {
        let q = ConditionQueue::<u32>::new(1);
        let (scope, cancel) = Scope::root().with_cancel();

        let waiter = {
            let q = q.clone();
            let scope = scope.clone();
            tokio::spawn(async move { Mux::new().take(&q).done(&scope).wait().await.is_done() })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
        assert!(waiter.await.unwrap());
    }

    /// Two always-ready sources must both win within a bounded number of
    /// repeated waits; the rotation makes systematic starvation impossible.
    #[tokio::test]
    async fn test_bounded_skip_fairness() {
        let a = BoundedChannel::new(64);
        let b = BoundedChannel::new(64);
        for i in 0..32 {
            a.send(i).await.unwrap();
            b.send(i).await.unwrap();
        }

        let mut wins = [0usize; 2];
        for _ in 0..32 {
            match Mux::new().recv(&a).recv(&b).wait().await {
                Outcome::Recv { source, .. } => wins[source] += 1,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert!(wins[0] > 0, "source 0 starved: {wins:?}");
        assert!(wins[1] > 0, "source 1 starved: {wins:?}");
    }

    #[tokio::test]
    async fn test_losing_source_consumes_nothing() {
        let ch = BoundedChannel::new(1);
        ch.send(1).await.unwrap();
        let q = ConditionQueue::new(1);
        q.put(2).await;

        // One of the two wins; the loser's item must still be there.
        let first = Mux::new().recv(&ch).take(&q).wait().await;
        let remaining = ch.len() + q.len();
        assert_eq!(remaining, 1, "loser consumed an item: {first:?}");
    }
}
