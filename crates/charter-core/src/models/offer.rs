//! Discount offer model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub yacht_id: Uuid,
    /// Whole percent, 0–100.
    pub discount_percentage: u32,
    pub description: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Active offers apply on the closed window `[valid_from, valid_until]`.
    pub fn applies_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.valid_from <= now && now <= self.valid_until
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOffer {
    pub yacht_id: Uuid,
    pub discount_percentage: u32,
    pub description: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
}
