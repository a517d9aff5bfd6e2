use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Location};
use crate::services::{lifecycle, matching, pricing};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub customer_id: String,
    pub service_category_id: String,
    pub pickup: Location,
    pub dropoff: Option<Location>,
    pub special_instructions: Option<String>,
    pub scheduled_time: Option<NaiveDateTime>,
}

fn validate_location(label: &str, location: &Location) -> Result<(), AppError> {
    if !location.coordinates().is_valid() {
        return Err(AppError::Validation(format!("{label} coordinates are out of range")));
    }
    if location.address.trim().is_empty() {
        return Err(AppError::Validation(format!("{label} address is required")));
    }
    Ok(())
}

/// Prices and stores a new pending booking, then announces it to providers.
///
/// `local_now` is the caller's wall clock; peak-hour surge reads its hour as-is.
pub async fn create_booking(
    state: &AppState,
    req: NewBooking,
    local_now: NaiveDateTime,
) -> Result<Booking, AppError> {
    if req.customer_id.trim().is_empty() {
        return Err(AppError::Validation("customer_id is required".to_string()));
    }
    validate_location("pickup", &req.pickup)?;
    if let Some(dropoff) = &req.dropoff {
        validate_location("dropoff", dropoff)?;
    }

    let category = {
        let db = db::lock(&state.db)?;
        queries::get_service_category(&db, &req.service_category_id)?
    }
    .filter(|c| c.is_active)
    .ok_or_else(|| AppError::NotFound(format!("service category {}", req.service_category_id)))?;

    let pickup = req.pickup.coordinates();
    let distance_km = match &req.dropoff {
        Some(dropoff) => Some(
            state
                .routes
                .estimate(&pickup, &dropoff.coordinates())
                .await
                .distance_km,
        ),
        None => None,
    };

    let surge = state.surge.multiplier(Some(&pickup), &local_now);
    let estimated_price = pricing::estimate(
        category.base_price,
        category.price_per_km,
        distance_km.unwrap_or(0.0),
        surge,
    );

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        customer_id: req.customer_id,
        provider_id: None,
        service_category_id: category.id,
        pickup: req.pickup,
        dropoff: req.dropoff,
        special_instructions: req
            .special_instructions
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        scheduled_time: req.scheduled_time,
        estimated_price,
        final_price: None,
        distance_km,
        status: BookingStatus::Pending,
        created_at: now,
        started_at: None,
        completed_at: None,
        updated_at: now,
    };

    {
        let db = db::lock(&state.db)?;
        queries::create_booking(&db, &booking)?;
    }

    tracing::info!(
        booking_id = %booking.id,
        customer_id = %booking.customer_id,
        estimated_price,
        surge,
        "booking created"
    );

    state
        .notifier
        .notify_new_booking_available(&booking.id)
        .await;

    Ok(booking)
}

pub fn get_booking(state: &AppState, id: &str) -> Result<Booking, AppError> {
    let db = db::lock(&state.db)?;
    lifecycle::load(&db, id)
}

pub fn list_available(
    state: &AppState,
    limit: Option<i64>,
    service_category_id: Option<&str>,
) -> Result<Vec<Booking>, AppError> {
    let limit = limit
        .unwrap_or(state.config.available_default_limit)
        .clamp(1, state.config.available_max_limit.max(1));
    let db = db::lock(&state.db)?;
    matching::list_available(&db, limit, service_category_id)
}

pub fn customer_history(state: &AppState, customer_id: &str) -> Result<Vec<Booking>, AppError> {
    let db = db::lock(&state.db)?;
    Ok(queries::get_bookings_for_customer(&db, customer_id)?)
}

pub fn provider_history(state: &AppState, provider_id: &str) -> Result<Vec<Booking>, AppError> {
    let db = db::lock(&state.db)?;
    Ok(queries::get_bookings_for_provider(&db, provider_id)?)
}

async fn announce(state: &AppState, booking: &Booking) {
    state
        .notifier
        .notify_status_changed(&booking.id, booking.status)
        .await;
}

pub async fn claim_booking(
    state: &AppState,
    id: &str,
    provider_id: &str,
) -> Result<Booking, AppError> {
    let booking = {
        let db = db::lock(&state.db)?;
        matching::claim(&db, id, provider_id, &Utc::now().naive_utc())?
    };
    announce(state, &booking).await;
    Ok(booking)
}

pub async fn start_booking(state: &AppState, id: &str) -> Result<Booking, AppError> {
    let booking = {
        let db = db::lock(&state.db)?;
        lifecycle::start(&db, id, &Utc::now().naive_utc())?
    };
    announce(state, &booking).await;
    Ok(booking)
}

pub async fn complete_booking(
    state: &AppState,
    id: &str,
    final_price: Option<f64>,
) -> Result<Booking, AppError> {
    let booking = {
        let db = db::lock(&state.db)?;
        lifecycle::complete(&db, id, final_price, &Utc::now().naive_utc())?
    };
    announce(state, &booking).await;
    Ok(booking)
}

pub async fn cancel_booking(state: &AppState, id: &str) -> Result<Booking, AppError> {
    let booking = {
        let db = db::lock(&state.db)?;
        lifecycle::cancel(&db, id, &Utc::now().naive_utc())?
    };
    announce(state, &booking).await;
    Ok(booking)
}
