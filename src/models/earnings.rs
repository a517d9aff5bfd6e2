use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Earnings {
    pub today: f64,
    pub this_week: f64,
    pub this_month: f64,
    pub total: f64,
    pub completed_count: i64,
}
