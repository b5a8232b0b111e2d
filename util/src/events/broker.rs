//! A thread-safe registry of realtime event subscribers.
//!
//! Each subscriber owns a bounded channel and a visibility filter. Delivery is
//! at-least-once and best-effort: a subscriber whose channel is full misses
//! that event, and a subscriber whose receiver has been dropped is pruned on
//! the next publish. There is no persistence or replay; reconnecting clients
//! must re-fetch authoritative state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

use super::TicketEvent;

/// Visibility predicate applied to every published event before delivery.
pub type EventFilter = Box<dyn Fn(&TicketEvent) -> bool + Send + Sync>;

/// Per-subscriber delivery channel capacity.
const SUBSCRIBER_BUFFER: usize = 64;

struct Subscriber {
    tx: mpsc::Sender<TicketEvent>,
    filter: EventFilter,
}

/// Owns the live subscriber set and fans published events out to it.
///
/// - `register` hands back a `Subscription` guard plus the receiving end of
///   the subscriber's channel.
/// - Dropping the `Subscription` unregisters promptly; no further deliveries.
#[derive(Clone, Default)]
pub struct EventBroker {
    inner: Arc<RwLock<HashMap<u64, Subscriber>>>,
    next_id: Arc<AtomicU64>,
}

/// RAII handle for a registered subscriber. Unregisters on drop.
pub struct Subscription {
    id: u64,
    broker: EventBroker,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broker.unregister(self.id);
    }
}

impl EventBroker {
    /// Creates a new, empty `EventBroker`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber with the given visibility filter.
    pub fn register(&self, filter: EventFilter) -> (Subscription, mpsc::Receiver<TicketEvent>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .write()
            .expect("event broker lock poisoned")
            .insert(id, Subscriber { tx, filter });
        (
            Subscription {
                id,
                broker: self.clone(),
            },
            rx,
        )
    }

    /// Removes a subscriber. Idempotent.
    pub fn unregister(&self, id: u64) {
        self.inner
            .write()
            .expect("event broker lock poisoned")
            .remove(&id);
    }

    /// Publishes an event to every subscriber whose filter matches.
    ///
    /// Subscribers with closed receivers are pruned; subscribers with full
    /// channels simply miss this event.
    pub fn publish(&self, event: &TicketEvent) {
        let mut dead: Vec<u64> = Vec::new();
        {
            let map = self.inner.read().expect("event broker lock poisoned");
            for (id, sub) in map.iter() {
                if !(sub.filter)(event) {
                    continue;
                }
                match sub.tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(subscriber = id, kind = event.kind.as_str(), "subscriber channel full, dropping event");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dead.push(*id);
                    }
                }
            }
        }
        if !dead.is_empty() {
            let mut map = self.inner.write().expect("event broker lock poisoned");
            for id in dead {
                map.remove(&id);
            }
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().expect("event broker lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TicketEventKind;
    use tokio::time::{Duration, timeout};

    fn event(kind: TicketEventKind, creator: i64) -> TicketEvent {
        TicketEvent::new(kind, "a1b2c3d4", creator)
    }

    #[tokio::test]
    async fn it_delivers_to_matching_subscribers() {
        let broker = EventBroker::new();
        let (_sub, mut rx) = broker.register(Box::new(|_| true));

        broker.publish(&event(TicketEventKind::TicketCreated, 7));

        let got = timeout(Duration::from_millis(50), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.kind, TicketEventKind::TicketCreated);
        assert_eq!(got.creator_user_id, 7);
    }

    #[tokio::test]
    async fn it_skips_non_matching_subscribers() {
        let broker = EventBroker::new();
        let (_sub, mut rx) = broker.register(Box::new(|e| e.creator_user_id == 1));

        broker.publish(&event(TicketEventKind::TicketMessage, 2));

        assert!(
            timeout(Duration::from_millis(50), rx.recv()).await.is_err(),
            "filtered-out event must not be delivered"
        );
    }

    #[tokio::test]
    async fn dropping_the_subscription_unregisters() {
        let broker = EventBroker::new();
        let (sub, _rx) = broker.register(Box::new(|_| true));
        assert_eq!(broker.subscriber_count(), 1);
        drop(sub);
        assert_eq!(broker.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn closed_receivers_are_pruned_on_publish() {
        let broker = EventBroker::new();
        let (_sub, rx) = broker.register(Box::new(|_| true));
        drop(rx);
        assert_eq!(broker.subscriber_count(), 1);
        broker.publish(&event(TicketEventKind::TicketUpdated, 1));
        assert_eq!(broker.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let broker = EventBroker::new();
        broker.publish(&event(TicketEventKind::TicketCreated, 1));
    }
}
