//! Fan-out of lifecycle events to subscribers.

use super::TradeEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Broadcasts trade events to any number of subscribers.
///
/// Publishing never blocks and never fails: with no subscribers the event is
/// dropped, and a slow subscriber sees `Lagged` instead of stalling trades.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TradeEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: TradeEvent) {
        trace!(asset = %event.asset_id, event_type = ?event.event_type, "Publishing trade event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TradeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{EventData, ExitData, TradeEventType};
    use chrono::Utc;
    use sniper_domain::AssetId;

    fn exit_event(event_type: TradeEventType) -> TradeEvent {
        TradeEvent::new(
            event_type,
            AssetId::new("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN"),
            EventData::Exit(ExitData {
                fire_at: Utc::now(),
                delay_secs: 180,
            }),
        )
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::default();
        bus.publish(exit_event(TradeEventType::ExitArmed));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(exit_event(TradeEventType::ExitArmed));
        bus.publish(exit_event(TradeEventType::ExitCancelled));

        assert_eq!(rx.recv().await.unwrap().event_type, TradeEventType::ExitArmed);
        assert_eq!(
            rx.recv().await.unwrap().event_type,
            TradeEventType::ExitCancelled
        );
    }
}
