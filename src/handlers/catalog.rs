use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::ServiceCategory;
use crate::state::AppState;

// GET /api/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceCategory>>, AppError> {
    let categories = {
        let db = db::lock(&state.db)?;
        queries::list_active_service_categories(&db)?
    };
    Ok(Json(categories))
}
