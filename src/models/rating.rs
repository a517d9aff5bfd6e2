use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: String,
    pub booking_id: String,
    pub rater_id: String,
    pub rated_user_id: String,
    pub score: i32,
    pub review: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingSummary {
    pub user_id: String,
    pub average: Option<f64>,
    pub count: i64,
}
