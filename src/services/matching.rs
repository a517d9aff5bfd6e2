//! The pending pool: listing unclaimed bookings and arbitrating claims.
//!
//! Nothing is locked between listing and claiming. The claim is a conditional update on
//! `status = 'pending' AND provider_id IS NULL`, so of any number of concurrent claimants
//! exactly one matches a row.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Trigger};
use crate::services::lifecycle;

pub fn list_available(
    conn: &Connection,
    limit: i64,
    service_category_id: Option<&str>,
) -> Result<Vec<Booking>, AppError> {
    Ok(queries::list_available_bookings(conn, limit, service_category_id)?)
}

/// Binds `provider_id` to a pending booking.
///
/// When the update matches nothing, the booking is re-read to classify the miss: if it has
/// just left the pool (accepted by someone else, or cancelled) the caller lost a race and
/// gets `StaleTransition`; if it is already further along, the claim itself was illegal.
pub fn claim(
    conn: &Connection,
    id: &str,
    provider_id: &str,
    now: &NaiveDateTime,
) -> Result<Booking, AppError> {
    if provider_id.trim().is_empty() {
        return Err(AppError::Validation("provider_id is required".to_string()));
    }

    if queries::claim_booking(conn, id, provider_id, now)? {
        tracing::info!(booking_id = id, provider_id, "booking claimed");
        return lifecycle::load(conn, id);
    }

    let current = lifecycle::load(conn, id)?;
    match current.status {
        BookingStatus::InProgress | BookingStatus::Completed => Err(AppError::InvalidTransition {
            current: current.status,
            trigger: Trigger::Claim,
            allowed: current.status.legal_triggers(),
        }),
        _ => {
            tracing::info!(
                booking_id = id,
                provider_id,
                status = %current.status,
                "claim lost, booking no longer available"
            );
            Err(AppError::StaleTransition {
                booking_id: id.to_string(),
                trigger: Trigger::Claim,
            })
        }
    }
}
