use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub id: String,
    pub name: String,
    pub kind: ServiceKind,
    pub description: Option<String>,
    pub base_price: f64,
    pub price_per_km: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Ride,
    Delivery,
    Errand,
    Moving,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Ride => "ride",
            ServiceKind::Delivery => "delivery",
            ServiceKind::Errand => "errand",
            ServiceKind::Moving => "moving",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ride" => Some(ServiceKind::Ride),
            "delivery" => Some(ServiceKind::Delivery),
            "errand" => Some(ServiceKind::Errand),
            "moving" => Some(ServiceKind::Moving),
            _ => None,
        }
    }
}
