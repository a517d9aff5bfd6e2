//! Fare estimation and surge calculation.
//!
//! Everything here is deterministic given its inputs. The only rounding happens once, on
//! the final amount, so a displayed estimate and a later recomputation always agree.

use chrono::{NaiveDateTime, Timelike};

use crate::models::Coordinates;
use crate::services::routing::haversine_km;

pub const BASE_MULTIPLIER: f64 = 1.0;
pub const PEAK_HOUR_SURGE: f64 = 0.5;
pub const HIGH_DEMAND_SURGE: f64 = 0.3;
pub const DEFAULT_HIGH_DEMAND_RADIUS_KM: f64 = 5.0;

/// Morning and evening commute windows as `[start, end)` hours on the caller's clock.
const PEAK_WINDOWS: [(u32, u32); 2] = [(7, 9), (17, 19)];

/// City centres where pickups draw a location surge.
pub const HIGH_DEMAND_AREAS: [Coordinates; 3] = [
    Coordinates {
        latitude: 40.7128,
        longitude: -74.0060,
    },
    Coordinates {
        latitude: 34.0522,
        longitude: -118.2437,
    },
    Coordinates {
        latitude: 41.8781,
        longitude: -87.6298,
    },
];

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `round2((base + per_km * distance) * surge)`.
pub fn estimate(base_price: f64, price_per_km: f64, distance_km: f64, surge_multiplier: f64) -> f64 {
    round2((base_price + price_per_km * distance_km) * surge_multiplier)
}

pub fn is_peak_hour(now: &NaiveDateTime) -> bool {
    let hour = now.hour();
    PEAK_WINDOWS
        .iter()
        .any(|(start, end)| hour >= *start && hour < *end)
}

#[derive(Debug, Clone)]
pub struct SurgePolicy {
    pub high_demand_areas: Vec<Coordinates>,
    pub radius_km: f64,
}

impl Default for SurgePolicy {
    fn default() -> Self {
        Self::with_radius(DEFAULT_HIGH_DEMAND_RADIUS_KM)
    }
}

impl SurgePolicy {
    pub fn with_radius(radius_km: f64) -> Self {
        Self {
            high_demand_areas: HIGH_DEMAND_AREAS.to_vec(),
            radius_km,
        }
    }

    pub fn in_high_demand_area(&self, pickup: &Coordinates) -> bool {
        self.high_demand_areas
            .iter()
            .any(|center| haversine_km(pickup, center) <= self.radius_km)
    }

    /// Time and location surges add to the base multiplier; they never compound.
    pub fn multiplier(&self, pickup: Option<&Coordinates>, now: &NaiveDateTime) -> f64 {
        let mut multiplier = BASE_MULTIPLIER;

        if is_peak_hour(now) {
            multiplier += PEAK_HOUR_SURGE;
        }

        if let Some(pickup) = pickup {
            if self.in_high_demand_area(pickup) {
                multiplier += HIGH_DEMAND_SURGE;
            }
        }

        round2(multiplier)
    }
}

/// Surge with the built-in high-demand table and default radius.
pub fn surge_multiplier(pickup: Option<&Coordinates>, now: &NaiveDateTime) -> f64 {
    SurgePolicy::default().multiplier(pickup, now)
}
