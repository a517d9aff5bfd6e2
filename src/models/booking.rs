use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A point on the map together with the address the customer typed or picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub provider_id: Option<String>,
    pub service_category_id: String,
    pub pickup: Location,
    pub dropoff: Option<Location>,
    pub special_instructions: Option<String>,
    pub scheduled_time: Option<NaiveDateTime>,
    pub estimated_price: f64,
    pub final_price: Option<f64>,
    pub distance_km: Option<f64>,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    /// Checks the cross-field rules that must hold after every transition. A cancelled
    /// booking keeps whatever provider it had, so it may or may not carry one.
    pub fn is_consistent(&self) -> bool {
        let provider_matches = self.status == BookingStatus::Cancelled
            || self.provider_id.is_none() == (self.status == BookingStatus::Pending);
        let price_matches = self.final_price.is_some() == (self.status == BookingStatus::Completed);
        provider_matches && price_matches
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "accepted" => Some(BookingStatus::Accepted),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Triggers that may be applied from this state, in lifecycle order.
    pub fn legal_triggers(&self) -> Vec<Trigger> {
        if self.is_terminal() {
            return vec![];
        }
        Trigger::ALL
            .into_iter()
            .filter(|t| t.source_states().contains(self))
            .collect()
    }

    /// Destination of `trigger` from this state, or `None` when the move is illegal.
    pub fn apply(&self, trigger: Trigger) -> Option<BookingStatus> {
        if trigger.source_states().contains(self) {
            Some(trigger.destination())
        } else {
            None
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle event requested against an existing booking. Creation is not a trigger
/// here since it has no source state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Claim,
    Start,
    Complete,
    Cancel,
}

impl Trigger {
    pub const ALL: [Trigger; 4] = [
        Trigger::Claim,
        Trigger::Start,
        Trigger::Complete,
        Trigger::Cancel,
    ];

    pub fn source_states(&self) -> &'static [BookingStatus] {
        match self {
            Trigger::Claim => &[BookingStatus::Pending],
            Trigger::Start => &[BookingStatus::Accepted],
            Trigger::Complete => &[BookingStatus::InProgress],
            Trigger::Cancel => &[BookingStatus::Pending, BookingStatus::Accepted],
        }
    }

    pub fn destination(&self) -> BookingStatus {
        match self {
            Trigger::Claim => BookingStatus::Accepted,
            Trigger::Start => BookingStatus::InProgress,
            Trigger::Complete => BookingStatus::Completed,
            Trigger::Cancel => BookingStatus::Cancelled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Claim => "claim",
            Trigger::Start => "start",
            Trigger::Complete => "complete",
            Trigger::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
