use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{BookingEvent, NotificationRelay};
use crate::models::BookingStatus;

/// In-process relay feeding the `/api/events` stream.
pub struct BroadcastRelay {
    tx: broadcast::Sender<BookingEvent>,
}

impl BroadcastRelay {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    fn publish(&self, event: BookingEvent) {
        // No subscribers is normal; the event is simply dropped.
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(
                booking_id = event.booking_id(),
                event = event.name(),
                "no event subscribers"
            );
        }
    }
}

#[async_trait]
impl NotificationRelay for BroadcastRelay {
    async fn notify_new_booking_available(&self, booking_id: &str) {
        self.publish(BookingEvent::NewBookingAvailable {
            booking_id: booking_id.to_string(),
        });
    }

    async fn notify_status_changed(&self, booking_id: &str, status: BookingStatus) {
        self.publish(BookingEvent::StatusChanged {
            booking_id: booking_id.to_string(),
            status,
        });
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<BookingEvent>> {
        Some(self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let relay = BroadcastRelay::new(16);
        let mut rx = relay.subscribe().unwrap();

        relay.notify_new_booking_available("b1").await;
        relay
            .notify_status_changed("b1", BookingStatus::Accepted)
            .await;

        assert_eq!(
            rx.recv().await.unwrap(),
            BookingEvent::NewBookingAvailable {
                booking_id: "b1".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            BookingEvent::StatusChanged {
                booking_id: "b1".to_string(),
                status: BookingStatus::Accepted
            }
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let relay = BroadcastRelay::new(4);
        relay.notify_new_booking_available("b1").await;
    }

    #[test]
    fn test_event_wire_shape() {
        let event = BookingEvent::StatusChanged {
            booking_id: "b1".to_string(),
            status: BookingStatus::InProgress,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "status_changed");
        assert_eq!(json["status"], "in_progress");
    }
}
