//! Broadcast channel for transport lifecycle events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The transport
//! publishes a [`TransportEvent`] on every lifecycle change and the
//! connection monitor subscribes once at startup.

use tokio::sync::broadcast;

use super::TransportEvent;

/// Broadcast bus for [`TransportEvent`]s.
///
/// When the ring buffer is full, the oldest events are dropped for
/// lagging receivers. Only the last event matters to the monitor, so a
/// small capacity is enough.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TransportEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration rejects that value.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: TransportEvent) -> usize {
        tracing::trace!(event_type = event.event_type_str(), "publishing lifecycle event");
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(8);
        assert_eq!(bus.publish(TransportEvent::Connected), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(TransportEvent::Connected);
        bus.publish(TransportEvent::Closed);

        let Ok(first) = rx.recv().await else {
            panic!("expected first event");
        };
        let Ok(second) = rx.recv().await else {
            panic!("expected second event");
        };
        assert_eq!(first, TransportEvent::Connected);
        assert_eq!(second, TransportEvent::Closed);
    }
}
