//! RealtimeHub: per-restaurant change feed
//!
//! ```text
//! handlers / services / iFood worker
//!       │ ChangeEvent
//!       ▼
//! RealtimeHub
//!   └── restaurants: restaurant_id → broadcast::Sender<ChangeEvent>
//!         │
//!         ▼
//!   WebSocket sessions (subscribe → push)
//! ```
//!
//! Events never cross restaurants. Publishing without subscribers is a no-op.

use dashmap::DashMap;
use shared::realtime::ChangeEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity per restaurant
pub const BROADCAST_CAPACITY: usize = 256;

#[derive(Clone, Default)]
pub struct RealtimeHub {
    channels: Arc<DashMap<i64, broadcast::Sender<ChangeEvent>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fan out an event to the restaurant's subscribers.
    ///
    /// Returns the number of receivers reached.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let restaurant_id = event.restaurant_id;
        let Some(tx) = self.channels.get(&restaurant_id).map(|t| t.clone()) else {
            return 0;
        };
        match tx.send(event) {
            Ok(n) => n,
            Err(_) => {
                // every receiver is gone
                self.prune(restaurant_id);
                0
            }
        }
    }

    pub fn subscribe(&self, restaurant_id: i64) -> broadcast::Receiver<ChangeEvent> {
        self.channels
            .entry(restaurant_id)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Drop the restaurant's channel when nobody listens anymore
    pub fn prune(&self, restaurant_id: i64) {
        self.channels
            .remove_if(&restaurant_id, |_, tx| tx.receiver_count() == 0);
    }

    pub fn subscriber_count(&self, restaurant_id: i64) -> usize {
        self.channels
            .get(&restaurant_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::realtime::ChangeAction;

    fn event(restaurant_id: i64, id: i64) -> ChangeEvent {
        ChangeEvent::new(
            "orders",
            ChangeAction::Insert,
            restaurant_id,
            serde_json::json!({ "id": id }),
        )
    }

    #[tokio::test]
    async fn subscriber_receives_events() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe(1);

        assert_eq!(hub.publish(event(1, 10)), 1);
        let got = rx.recv().await.unwrap();
        assert_eq!(got.record["id"], 10);
        assert_eq!(got.table, "orders");
    }

    #[tokio::test]
    async fn restaurants_are_isolated() {
        let hub = RealtimeHub::new();
        let mut a = hub.subscribe(1);
        let mut b = hub.subscribe(2);

        hub.publish(event(2, 20));
        hub.publish(event(1, 10));

        assert_eq!(a.recv().await.unwrap().record["id"], 10);
        assert_eq!(b.recv().await.unwrap().record["id"], 20);
        assert!(a.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let hub = RealtimeHub::new();
        assert_eq!(hub.publish(event(7, 1)), 0);
        assert_eq!(hub.channel_count(), 0);
    }

    #[test]
    fn empty_channels_are_pruned() {
        let hub = RealtimeHub::new();
        let rx = hub.subscribe(3);
        assert_eq!(hub.subscriber_count(3), 1);

        drop(rx);
        assert_eq!(hub.publish(event(3, 1)), 0);
        assert_eq!(hub.channel_count(), 0);
    }

    #[tokio::test]
    async fn slow_receiver_lags() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe(1);
        for i in 0..(BROADCAST_CAPACITY as i64 + 5) {
            hub.publish(event(1, i));
        }
        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(n)) => assert_eq!(n, 5),
            other => panic!("expected lag, got {other:?}"),
        }
    }
}
