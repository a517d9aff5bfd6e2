pub mod bookings;
pub mod catalog;
pub mod events;
pub mod health;
pub mod users;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/services", get(catalog::list_services))
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/bookings/available", get(bookings::list_available))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route("/api/bookings/:id/claim", post(bookings::claim_booking))
        .route("/api/bookings/:id/start", post(bookings::start_booking))
        .route("/api/bookings/:id/complete", post(bookings::complete_booking))
        .route("/api/bookings/:id/cancel", post(bookings::cancel_booking))
        .route(
            "/api/bookings/:id/ratings",
            get(bookings::list_ratings).post(bookings::submit_rating),
        )
        .route("/api/customers/:id/bookings", get(users::customer_bookings))
        .route("/api/providers/:id/bookings", get(users::provider_bookings))
        .route("/api/providers/:id/earnings", get(users::provider_earnings))
        .route("/api/users/:id/rating", get(users::rating_summary))
        .route("/api/events", get(events::events_stream))
        .with_state(state)
}
