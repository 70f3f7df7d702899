//! # ConditionQueue: bounded buffer with predicate re-check loops.
//!
//! Producers wait on the **not-full** condition, consumers on **not-empty**.
//! Every wait re-checks its predicate in a loop around the suspension: a
//! woken waiter may lose the race to another producer/consumer before it
//! reacquires the lock, so a single wake-up is never trusted. Every
//! successful `put`/`take` wakes **all** waiters on the opposite condition
//! (broadcast); the losers simply park again.
//!
//! ```text
//! put(v):                       take():
//!   loop {                        loop {
//!     enable(not_full)              enable(not_empty)
//!     lock {                        lock {
//!       len < cap? → push,            item? → pop,
//!                    wake not_empty,          wake not_full,
//!                    return                   return v
//!     }                             }
//!     await not_full                await not_empty
//!   }                             }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::QueueFullError;

struct Shared<T> {
    capacity: usize,
    buffer: Mutex<VecDeque<T>>,
    not_full: Notify,
    not_empty: Notify,
}

/// Bounded FIFO coordinated by explicit wait conditions.
///
/// Cloneable handle; all clones observe the same queue. Capacity is fixed at
/// construction (minimum 1). There is no close operation — callers
/// coordinate shutdown through an external [`Scope`](crate::Scope), raced
/// against [`take`](ConditionQueue::take) in the [`Mux`](crate::Mux).
///
/// ## Example
/// ```rust
/// use taskscope::ConditionQueue;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let q = ConditionQueue::new(2);
///     q.put("job").await;
///     assert_eq!(q.take().await, "job");
/// }
/// ```
pub struct ConditionQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for ConditionQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> ConditionQueue<T> {
    /// Creates a queue with the given capacity, clamped to a minimum of 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                capacity: capacity.max(1),
                buffer: Mutex::new(VecDeque::new()),
                not_full: Notify::new(),
                not_empty: Notify::new(),
            }),
        }
    }

    /// Appends a value, waiting while the queue is at capacity.
    pub async fn put(&self, value: T) {
        loop {
            let notified = self.shared.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut buf = self.shared.buffer.lock();
                if buf.len() < self.shared.capacity {
                    buf.push_back(value);
                    drop(buf);
                    self.shared.not_empty.notify_waiters();
                    return;
                }
            }
            notified.await;
        }
    }

    /// Attempts to append without waiting; fails when at capacity, handing
    /// the value back.
    pub fn try_put(&self, value: T) -> Result<(), QueueFullError<T>> {
        let mut buf = self.shared.buffer.lock();
        if buf.len() >= self.shared.capacity {
            return Err(QueueFullError(value));
        }
        buf.push_back(value);
        drop(buf);
        self.shared.not_empty.notify_waiters();
        Ok(())
    }

    /// Removes the next value in FIFO order, waiting while the queue is
    /// empty.
    pub async fn take(&self) -> T {
        loop {
            let notified = self.shared.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut buf = self.shared.buffer.lock();
                if let Some(v) = buf.pop_front() {
                    drop(buf);
                    self.shared.not_full.notify_waiters();
                    return v;
                }
            }
            notified.await;
        }
    }

    /// Attempts to remove the next value without waiting.
    pub fn try_take(&self) -> Option<T> {
        let v = self.shared.buffer.lock().pop_front();
        if v.is_some() {
            self.shared.not_full.notify_waiters();
        }
        v
    }

    /// Number of items currently buffered.
    pub fn len(&self) -> usize {
        self.shared.buffer.lock().len()
    }

    /// `true` when no items are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity (after clamping).
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let q = ConditionQueue::new(3);
        q.put(1).await;
        q.put(2).await;
        q.put(3).await;
        assert_eq!(q.take().await, 1);
        assert_eq!(q.take().await, 2);
        assert_eq!(q.take().await, 3);
    }

    #[tokio::test]
    async fn test_capacity_clamped_to_one() {
        let q = ConditionQueue::<u8>::new(0);
        assert_eq!(q.capacity(), 1);
    }

    #[tokio::test]
    async fn test_try_put_full() {
        let q = ConditionQueue::new(1);
        q.put(1).await;
        assert_eq!(q.try_put(2), Err(QueueFullError(2)));
        assert_eq!(q.try_take(), Some(1));
        assert!(q.try_take().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_put_waits_for_take() {
        let q = ConditionQueue::new(1);
        q.put(1).await;

        let producer = q.clone();
        let blocked = tokio::spawn(async move { producer.put(2).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!blocked.is_finished());

        assert_eq!(q.take().await, 1);
        blocked.await.unwrap();
        assert_eq!(q.take().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_waits_for_put() {
        let q = ConditionQueue::<u32>::new(1);
        let consumer = q.clone();
        let pending = tokio::spawn(async move { consumer.take().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!pending.is_finished());

        q.put(9).await;
        assert_eq!(pending.await.unwrap(), 9);
    }

    /// Randomized interleaving stress: no item lost or duplicated across
    /// many producer/consumer races on a capacity-1 queue.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stress_no_loss_no_duplication() {
        const PRODUCERS: usize = 4;
        const CONSUMERS: usize = 4;
        const PER_PRODUCER: usize = 2500;
        const TOTAL: usize = PRODUCERS * PER_PRODUCER;

        let q = ConditionQueue::new(1);
        let taken = Arc::new(AtomicUsize::new(0));
        let sum = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for p in 0..PRODUCERS {
            let q = q.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..PER_PRODUCER {
                    q.put(p * PER_PRODUCER + i).await;
                }
            }));
        }
        for _ in 0..CONSUMERS {
            let q = q.clone();
            let taken = taken.clone();
            let sum = sum.clone();
            tasks.push(tokio::spawn(async move {
                loop {
                    if taken.fetch_add(1, Ordering::SeqCst) >= TOTAL {
                        break;
                    }
                    let v = q.take().await;
                    sum.fetch_add(v, Ordering::SeqCst);
                }
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        assert_eq!(q.len(), 0);
        assert_eq!(sum.load(Ordering::SeqCst), TOTAL * (TOTAL - 1) / 2);
    }
}
