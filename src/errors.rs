use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{BookingStatus, Trigger};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("cannot {trigger} a booking that is {current} (allowed: {})", format_triggers(.allowed))]
    InvalidTransition {
        current: BookingStatus,
        trigger: Trigger,
        allowed: Vec<Trigger>,
    },

    #[error("booking {booking_id} changed concurrently before {trigger} could apply")]
    StaleTransition { booking_id: String, trigger: Trigger },

    #[error("score {0} is outside 1..=5")]
    InvalidScore(i32),

    #[error("booking {0} is not completed")]
    BookingNotCompleted(String),

    #[error("booking {booking_id} was already rated by {rater_id}")]
    DuplicateRating { booking_id: String, rater_id: String },
}

fn format_triggers(triggers: &[Trigger]) -> String {
    if triggers.is_empty() {
        return "none".to_string();
    }
    triggers
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "internal",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::StaleTransition { .. } => "stale_transition",
            AppError::InvalidScore(_) => "invalid_score",
            AppError::BookingNotCompleted(_) => "booking_not_completed",
            AppError::DuplicateRating { .. } => "duplicate_rating",
        }
    }

    /// Message shown to end users. State names and internals stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "internal error".to_string(),
            AppError::InvalidTransition { .. } => "action unavailable".to_string(),
            AppError::StaleTransition { .. } => "booking no longer available".to_string(),
            AppError::BookingNotCompleted(_) => {
                "ratings can only be submitted for completed bookings".to_string()
            }
            AppError::InvalidScore(_) => "score must be between 1 and 5".to_string(),
            AppError::DuplicateRating { .. } => "this booking was already rated".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidScore(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BookingNotCompleted(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::StaleTransition { .. } => StatusCode::CONFLICT,
            AppError::DuplicateRating { .. } => StatusCode::CONFLICT,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.user_message(), "code": self.code() });
        (status, axum::Json(body)).into_response()
    }
}
