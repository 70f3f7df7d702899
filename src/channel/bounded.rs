//! # BoundedChannel: fixed-capacity FIFO handoff.
//!
//! A cloneable MPMC channel over a shared buffer. Senders block while the
//! channel is full, receivers block while it is empty, and a one-shot
//! [`close`](BoundedChannel::close) switches the channel into drain mode.
//!
//! ## Waiting protocol
//! Both sides use the same discipline: register interest
//! (`Notified::enable`) **before** re-checking the predicate under the lock,
//! then await. State changes wake the opposite side with `notify_waiters`
//! (broadcast), and every waiter re-checks in a loop, so a wake-up that
//! loses the race simply parks again.
//!
//! ```text
//! send(v):                         recv():
//!   loop {                           loop {
//!     enable(send_ready)               enable(recv_ready)
//!     lock {                           lock {
//!       closed?      → Err(v)            pop item? → wake senders, return
//!       space/taker? → push,             closed?   → return None
//!                      wake receivers,   park (recv_parked += 1)
//!                      return Ok        }
//!     }                                wake senders (rendezvous handoff)
//!     await send_ready                 await recv_ready
//!   }                                }
//! ```
//!
//! ## Rendezvous (capacity 0)
//! A send completes only when a receiver is concurrently parked: the item is
//! handed into the buffer against a parked receiver and the send returns. If
//! that receiver's future is dropped before pickup, the item stays claimable
//! by the next receiver; nothing is lost.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{CloseError, SendError, TryRecvError, TrySendError};

struct State<T> {
    buffer: VecDeque<T>,
    closed: bool,
    /// Receivers currently parked; rendezvous sends require one.
    recv_parked: usize,
}

struct Shared<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    /// Notified when space frees, a receiver parks, or the channel closes.
    send_ready: Notify,
    /// Notified when an item arrives or the channel closes.
    recv_ready: Notify,
}

/// Fixed-capacity FIFO channel between concurrent tasks.
///
/// Cloneable handle; all clones observe the same channel. Any clone may
/// send, receive, or close.
///
/// ## Example
/// ```rust
/// use taskscope::BoundedChannel;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let ch = BoundedChannel::new(2);
///     ch.send(1).await.unwrap();
///     ch.send(2).await.unwrap();
///     ch.close().unwrap();
///
///     // Drain loop: yields buffered items, then `None` forever.
///     assert_eq!(ch.recv().await, Some(1));
///     assert_eq!(ch.recv().await, Some(2));
///     assert_eq!(ch.recv().await, None);
/// }
/// ```
pub struct BoundedChannel<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BoundedChannel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Decrements the parked-receiver count when a waiting `recv` resumes or is
/// dropped mid-wait.
struct Parked<'a, T> {
    shared: &'a Shared<T>,
}

impl<T> Drop for Parked<'_, T> {
    fn drop(&mut self) {
        self.shared.state.lock().recv_parked -= 1;
    }
}

impl<T> BoundedChannel<T> {
    /// Creates a channel with the given capacity.
    ///
    /// Capacity `0` creates a rendezvous channel: sends complete only
    /// against a concurrently waiting receiver.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                capacity,
                state: Mutex::new(State {
                    buffer: VecDeque::new(),
                    closed: false,
                    recv_parked: 0,
                }),
                send_ready: Notify::new(),
                recv_ready: Notify::new(),
            }),
        }
    }

    /// Sends a value, waiting while the channel is full.
    ///
    /// Fails immediately (without blocking) once the channel is closed,
    /// handing the value back.
    pub async fn send(&self, value: T) -> Result<(), SendError<T>> {
        loop {
            let notified = self.shared.send_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut st = self.shared.state.lock();
                if st.closed {
                    return Err(SendError(value));
                }
                if has_room(&st, self.shared.capacity) {
                    st.buffer.push_back(value);
                    drop(st);
                    self.shared.recv_ready.notify_waiters();
                    return Ok(());
                }
            }
            notified.await;
        }
    }

    /// Attempts to send without waiting.
    ///
    /// Fails with [`TrySendError::Full`] when the channel is at capacity
    /// (or, for a rendezvous channel, no receiver is parked), and with
    /// [`TrySendError::Closed`] once closed.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let mut st = self.shared.state.lock();
        if st.closed {
            return Err(TrySendError::Closed(value));
        }
        if !has_room(&st, self.shared.capacity) {
            return Err(TrySendError::Full(value));
        }
        st.buffer.push_back(value);
        drop(st);
        self.shared.recv_ready.notify_waiters();
        Ok(())
    }

    /// Receives the next value in FIFO order, waiting while the channel is
    /// empty.
    ///
    /// Returns `None` only once the channel is closed **and** drained, and
    /// forever after.
    pub async fn recv(&self) -> Option<T> {
        loop {
            let notified = self.shared.recv_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut st = self.shared.state.lock();
                if let Some(v) = st.buffer.pop_front() {
                    drop(st);
                    self.shared.send_ready.notify_waiters();
                    return Some(v);
                }
                if st.closed {
                    return None;
                }
                st.recv_parked += 1;
            }
            let _parked = Parked {
                shared: &self.shared,
            };
            // A parked receiver is what a rendezvous sender waits for.
            self.shared.send_ready.notify_waiters();
            notified.await;
        }
    }

    /// Attempts to receive without waiting.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut st = self.shared.state.lock();
        if let Some(v) = st.buffer.pop_front() {
            drop(st);
            self.shared.send_ready.notify_waiters();
            return Ok(v);
        }
        if st.closed {
            Err(TryRecvError::Closed)
        } else {
            Err(TryRecvError::Empty)
        }
    }

    /// Closes the channel.
    ///
    /// Subsequent sends fail immediately; receives drain the remaining
    /// buffered items, then yield `None`. Closing twice is an error.
    pub fn close(&self) -> Result<(), CloseError> {
        {
            let mut st = self.shared.state.lock();
            if st.closed {
                return Err(CloseError);
            }
            st.closed = true;
        }
        self.shared.send_ready.notify_waiters();
        self.shared.recv_ready.notify_waiters();
        Ok(())
    }

    /// Number of items currently buffered.
    pub fn len(&self) -> usize {
        self.shared.state.lock().buffer.len()
    }

    /// `true` when no items are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity this channel was created with.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// `true` once the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }
}

/// Send predicate: buffered channels need a free slot, rendezvous channels
/// need a parked receiver that is not already matched with a buffered item.
fn has_room<T>(st: &State<T>, capacity: usize) -> bool {
    if capacity == 0 {
        st.recv_parked > st.buffer.len()
    } else {
        st.buffer.len() < capacity
    }
}
