//! Yacht (bookable resource) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Yacht {
    pub id: Uuid,
    pub name: String,
    /// Price per charter hour in minor currency units (fils).
    pub hourly_price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateYacht {
    pub name: String,
    pub hourly_price: i64,
}
