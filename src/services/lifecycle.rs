//! Booking state machine over the store.
//!
//! Each transition reads the booking, checks the trigger against the transition table and
//! then issues one conditional update keyed on the state it read. A zero-row update means
//! another writer moved the booking first and is reported as [`AppError::StaleTransition`].

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, Trigger};
use crate::services::pricing::round2;

pub fn load(conn: &Connection, id: &str) -> Result<Booking, AppError> {
    queries::get_booking_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

pub fn ensure_legal(booking: &Booking, trigger: Trigger) -> Result<(), AppError> {
    if booking.status.apply(trigger).is_some() {
        return Ok(());
    }
    Err(AppError::InvalidTransition {
        current: booking.status,
        trigger,
        allowed: booking.status.legal_triggers(),
    })
}

fn stale(id: &str, trigger: Trigger) -> AppError {
    tracing::info!(booking_id = id, trigger = %trigger, "transition lost to a concurrent update");
    AppError::StaleTransition {
        booking_id: id.to_string(),
        trigger,
    }
}

pub fn start(conn: &Connection, id: &str, now: &NaiveDateTime) -> Result<Booking, AppError> {
    let booking = load(conn, id)?;
    ensure_legal(&booking, Trigger::Start)?;

    if !queries::start_booking(conn, id, now)? {
        return Err(stale(id, Trigger::Start));
    }
    load(conn, id)
}

/// Completes a booking. Without an override the final price is the estimate.
pub fn complete(
    conn: &Connection,
    id: &str,
    final_price: Option<f64>,
    now: &NaiveDateTime,
) -> Result<Booking, AppError> {
    if let Some(price) = final_price {
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::Validation(
                "final_price must be a non-negative amount".to_string(),
            ));
        }
    }

    let booking = load(conn, id)?;
    ensure_legal(&booking, Trigger::Complete)?;

    let price = final_price.map(round2).unwrap_or(booking.estimated_price);
    if !queries::complete_booking(conn, id, price, now)? {
        return Err(stale(id, Trigger::Complete));
    }
    load(conn, id)
}

pub fn cancel(conn: &Connection, id: &str, now: &NaiveDateTime) -> Result<Booking, AppError> {
    let booking = load(conn, id)?;
    ensure_legal(&booking, Trigger::Cancel)?;

    if !queries::cancel_booking(conn, id, booking.status, now)? {
        return Err(stale(id, Trigger::Cancel));
    }
    load(conn, id)
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db;
    use crate::models::{BookingStatus, Location};

    pub(crate) fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    pub(crate) fn insert_pending(conn: &Connection, id: &str, estimated_price: f64) -> Booking {
        let now = Utc::now().naive_utc();
        let booking = Booking {
            id: id.to_string(),
            customer_id: "customer-1".to_string(),
            provider_id: None,
            service_category_id: "ride".to_string(),
            pickup: Location {
                latitude: 40.0,
                longitude: -73.0,
                address: "1 Main St".to_string(),
            },
            dropoff: None,
            special_instructions: None,
            scheduled_time: None,
            estimated_price,
            final_price: None,
            distance_km: None,
            status: BookingStatus::Pending,
            created_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        };
        queries::create_booking(conn, &booking).unwrap();
        booking
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    #[test]
    fn test_full_lifecycle_sets_timestamps_and_price() {
        let conn = setup_db();
        insert_pending(&conn, "b1", 9.0);

        assert!(queries::claim_booking(&conn, "b1", "provider-1", &now()).unwrap());
        let started = start(&conn, "b1", &now()).unwrap();
        assert_eq!(started.status, BookingStatus::InProgress);
        assert!(started.started_at.is_some());
        assert!(started.is_consistent());

        let done = complete(&conn, "b1", None, &now()).unwrap();
        assert_eq!(done.status, BookingStatus::Completed);
        assert_eq!(done.final_price, Some(9.0));
        assert!(done.completed_at.is_some());
        assert!(done.updated_at >= started.updated_at);
        assert!(done.is_consistent());
    }

    #[test]
    fn test_complete_with_override() {
        let conn = setup_db();
        insert_pending(&conn, "b1", 9.0);
        queries::claim_booking(&conn, "b1", "provider-1", &now()).unwrap();
        start(&conn, "b1", &now()).unwrap();

        let done = complete(&conn, "b1", Some(12.346), &now()).unwrap();
        assert_eq!(done.final_price, Some(12.35));
        assert_eq!(done.estimated_price, 9.0);
    }

    #[test]
    fn test_complete_rejects_negative_override() {
        let conn = setup_db();
        insert_pending(&conn, "b1", 9.0);
        let err = complete(&conn, "b1", Some(-1.0), &now()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_complete_then_cancel_is_invalid() {
        let conn = setup_db();
        insert_pending(&conn, "b1", 9.0);
        queries::claim_booking(&conn, "b1", "provider-1", &now()).unwrap();
        start(&conn, "b1", &now()).unwrap();
        complete(&conn, "b1", None, &now()).unwrap();

        let err = cancel(&conn, "b1", &now()).unwrap_err();
        match err {
            AppError::InvalidTransition {
                current,
                trigger,
                allowed,
            } => {
                assert_eq!(current, BookingStatus::Completed);
                assert_eq!(trigger, Trigger::Cancel);
                assert!(allowed.is_empty());
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_from_pending_is_invalid() {
        let conn = setup_db();
        insert_pending(&conn, "b1", 9.0);

        let err = complete(&conn, "b1", None, &now()).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                current: BookingStatus::Pending,
                trigger: Trigger::Complete,
                ..
            }
        ));
    }

    #[test]
    fn test_cancel_in_progress_is_invalid() {
        let conn = setup_db();
        insert_pending(&conn, "b1", 9.0);
        queries::claim_booking(&conn, "b1", "provider-1", &now()).unwrap();
        start(&conn, "b1", &now()).unwrap();

        let err = cancel(&conn, "b1", &now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn test_cancel_pending_keeps_provider_empty() {
        let conn = setup_db();
        insert_pending(&conn, "b1", 9.0);

        let cancelled = cancel(&conn, "b1", &now()).unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert!(cancelled.provider_id.is_none());
        assert!(cancelled.final_price.is_none());
    }

    #[test]
    fn test_cancel_accepted_keeps_provider() {
        let conn = setup_db();
        insert_pending(&conn, "b1", 9.0);
        queries::claim_booking(&conn, "b1", "provider-1", &now()).unwrap();

        let cancelled = cancel(&conn, "b1", &now()).unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.provider_id.as_deref(), Some("provider-1"));
    }

    #[test]
    fn test_unknown_booking_is_not_found() {
        let conn = setup_db();
        assert!(matches!(
            start(&conn, "missing", &now()).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn test_conditional_update_rejects_wrong_source_state() {
        let conn = setup_db();
        insert_pending(&conn, "b1", 9.0);

        // A writer that read `accepted` races one that already cancelled.
        queries::claim_booking(&conn, "b1", "provider-1", &now()).unwrap();
        cancel(&conn, "b1", &now()).unwrap();
        assert!(!queries::start_booking(&conn, "b1", &now()).unwrap());
        assert!(!queries::cancel_booking(&conn, "b1", BookingStatus::Accepted, &now()).unwrap());
    }
}
