use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Local, Utc};
use serde::Deserialize;

use crate::db;
use crate::errors::AppError;
use crate::models::{Booking, Rating};
use crate::services::bookings::{self, NewBooking};
use crate::services::ratings::{self, NewRating};
use crate::state::AppState;

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = bookings::create_booking(&state, req, Local::now().naive_local()).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(bookings::get_booking(&state, &id)?))
}

// GET /api/bookings/available
#[derive(Deserialize)]
pub struct AvailableQuery {
    pub limit: Option<i64>,
    pub service_category_id: Option<String>,
}

pub async fn list_available(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let available =
        bookings::list_available(&state, query.limit, query.service_category_id.as_deref())?;
    Ok(Json(available))
}

// POST /api/bookings/:id/claim
#[derive(Deserialize)]
pub struct ClaimRequest {
    pub provider_id: String,
}

pub async fn claim_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(
        bookings::claim_booking(&state, &id, &req.provider_id).await?,
    ))
}

// POST /api/bookings/:id/start
pub async fn start_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(bookings::start_booking(&state, &id).await?))
}

// POST /api/bookings/:id/complete
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CompleteRequest {
    pub final_price: Option<f64>,
}

/// An empty body means no override; anything else must parse.
fn parse_complete_body(body: &[u8]) -> Result<CompleteRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CompleteRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("invalid complete request: {e}")))
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Booking>, AppError> {
    let final_price = parse_complete_body(&body)?.final_price;
    Ok(Json(
        bookings::complete_booking(&state, &id, final_price).await?,
    ))
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(bookings::cancel_booking(&state, &id).await?))
}

// GET /api/bookings/:id/ratings
pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Rating>>, AppError> {
    let ratings = {
        let db = db::lock(&state.db)?;
        ratings::for_booking(&db, &id)?
    };
    Ok(Json(ratings))
}

// POST /api/bookings/:id/ratings
pub async fn submit_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<NewRating>,
) -> Result<(StatusCode, Json<Rating>), AppError> {
    let rating = {
        let db = db::lock(&state.db)?;
        ratings::submit(&db, &id, req, &Utc::now().naive_utc())?
    };
    Ok((StatusCode::CREATED, Json(rating)))
}
