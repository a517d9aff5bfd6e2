use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;

use crate::db;
use crate::errors::AppError;
use crate::models::{Booking, Earnings, RatingSummary};
use crate::services::{bookings, earnings, ratings};
use crate::state::AppState;

// GET /api/customers/:id/bookings
pub async fn customer_bookings(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(bookings::customer_history(&state, &customer_id)?))
}

// GET /api/providers/:id/bookings
pub async fn provider_bookings(
    State(state): State<Arc<AppState>>,
    Path(provider_id): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(bookings::provider_history(&state, &provider_id)?))
}

// GET /api/providers/:id/earnings
pub async fn provider_earnings(
    State(state): State<Arc<AppState>>,
    Path(provider_id): Path<String>,
) -> Result<Json<Earnings>, AppError> {
    // completed_at is stored in UTC
    let now = Utc::now().naive_utc();
    let summary = {
        let db = db::lock(&state.db)?;
        earnings::for_provider(&db, &provider_id, &now)?
    };
    Ok(Json(summary))
}

// GET /api/users/:id/rating
pub async fn rating_summary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<RatingSummary>, AppError> {
    let summary = {
        let db = db::lock(&state.db)?;
        ratings::summary(&db, &user_id)?
    };
    Ok(Json(summary))
}
