pub mod broadcast;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::Receiver;

use crate::models::BookingStatus;

/// Outbound booking events. Delivery is fire-and-forget and at most once; polling the
/// available list stays the source of truth for providers.
#[async_trait]
pub trait NotificationRelay: Send + Sync {
    async fn notify_new_booking_available(&self, booking_id: &str);

    async fn notify_status_changed(&self, booking_id: &str, status: BookingStatus);

    /// Live feed of events for streaming to clients, when the relay keeps one.
    fn subscribe(&self) -> Option<Receiver<BookingEvent>> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingEvent {
    NewBookingAvailable { booking_id: String },
    StatusChanged { booking_id: String, status: BookingStatus },
}

impl BookingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BookingEvent::NewBookingAvailable { .. } => "new_booking_available",
            BookingEvent::StatusChanged { .. } => "status_changed",
        }
    }

    pub fn booking_id(&self) -> &str {
        match self {
            BookingEvent::NewBookingAvailable { booking_id } => booking_id,
            BookingEvent::StatusChanged { booking_id, .. } => booking_id,
        }
    }
}
