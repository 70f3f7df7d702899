//! # Event bus for broadcasting supervisor events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] providing
//! non-blocking publishing from the supervisor to any number of receivers.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: one ring buffer stores recent events for all
//!   receivers; the minimum capacity is 1 (clamped).
//! - **Lag handling**: slow receivers observe `RecvError::Lagged(n)` and
//!   skip the `n` oldest items.
//! - **No persistence**: events are dropped when no receiver is subscribed
//!   at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for supervisor events.
///
/// Cheap to clone (internally an `Arc`-backed sender); clones publish into
/// the same ring buffer.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// With no receivers the event is dropped; publish still returns
    /// immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver observing events published **after** this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::now(EventKind::WorkerSpawned).with_worker("w"));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::WorkerSpawned);
        assert_eq!(ev.worker.as_deref(), Some("w"));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let bus = Bus::new(8);
        bus.publish(Event::now(EventKind::AllWorkersJoined));
        // Late subscriber sees nothing from before its subscription.
        let mut rx = bus.subscribe();
        bus.publish(Event::now(EventKind::SupervisorCancelled));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::SupervisorCancelled);
    }
}
