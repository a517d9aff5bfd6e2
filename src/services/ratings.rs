use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::rating::{MAX_SCORE, MIN_SCORE};
use crate::models::{BookingStatus, Rating, RatingSummary};
use crate::services::lifecycle;
use crate::services::pricing::round2;

#[derive(Debug, Clone, Deserialize)]
pub struct NewRating {
    pub rater_id: String,
    pub rated_user_id: String,
    pub score: i32,
    pub review: Option<String>,
}

/// Records feedback for a completed booking. Ratings are write-once.
pub fn submit(
    conn: &Connection,
    booking_id: &str,
    input: NewRating,
    now: &NaiveDateTime,
) -> Result<Rating, AppError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&input.score) {
        return Err(AppError::InvalidScore(input.score));
    }
    if input.rater_id.trim().is_empty() || input.rated_user_id.trim().is_empty() {
        return Err(AppError::Validation(
            "rater_id and rated_user_id are required".to_string(),
        ));
    }

    let booking = lifecycle::load(conn, booking_id)?;
    if booking.status != BookingStatus::Completed {
        return Err(AppError::BookingNotCompleted(booking_id.to_string()));
    }

    let rating = Rating {
        id: Uuid::new_v4().to_string(),
        booking_id: booking_id.to_string(),
        rater_id: input.rater_id,
        rated_user_id: input.rated_user_id,
        score: input.score,
        review: input
            .review
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()),
        created_at: *now,
    };

    if !queries::insert_rating(conn, &rating)? {
        return Err(AppError::DuplicateRating {
            booking_id: rating.booking_id,
            rater_id: rating.rater_id,
        });
    }

    tracing::info!(
        booking_id,
        rated_user_id = %rating.rated_user_id,
        score = rating.score,
        "rating recorded"
    );
    Ok(rating)
}

pub fn for_booking(conn: &Connection, booking_id: &str) -> Result<Vec<Rating>, AppError> {
    lifecycle::load(conn, booking_id)?;
    Ok(queries::get_ratings_for_booking(conn, booking_id)?)
}

/// Average score to two decimals, `None` before the first rating.
pub fn summary(conn: &Connection, user_id: &str) -> Result<RatingSummary, AppError> {
    let (average, count) = queries::get_rating_stats(conn, user_id)?;
    Ok(RatingSummary {
        user_id: user_id.to_string(),
        average: average.map(round2),
        count,
    })
}
