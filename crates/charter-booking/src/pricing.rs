//! Charter price computation.
//!
//! Amounts are integers in the currency's minor unit (fils for AED).

use charter_core::models::offer::Offer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub hourly_rate: i64,
    pub hours: u32,
    pub discount_percentage: u32,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub offer_id: Option<Uuid>,
}

impl Quote {
    /// `subtotal = rate × hours`, `discount = subtotal × pct / 100`
    /// rounded half-up, `total = subtotal − discount`.
    pub fn compute(
        hourly_rate: i64,
        hours: u32,
        discount_percentage: u32,
    ) -> Result<Self, BookingError> {
        if hourly_rate < 0 {
            return Err(BookingError::InvalidPrice(format!(
                "hourly rate must not be negative, got {hourly_rate}"
            )));
        }
        if discount_percentage > 100 {
            return Err(BookingError::InvalidPrice(format!(
                "discount must be at most 100%, got {discount_percentage}%"
            )));
        }

        let subtotal = hourly_rate
            .checked_mul(i64::from(hours))
            .ok_or_else(|| BookingError::InvalidPrice("subtotal overflows".into()))?;
        let discount = subtotal
            .checked_mul(i64::from(discount_percentage))
            .and_then(|v| v.checked_add(50))
            .map(|v| v / 100)
            .ok_or_else(|| BookingError::InvalidPrice("discount overflows".into()))?;

        Ok(Self {
            hourly_rate,
            hours,
            discount_percentage,
            subtotal,
            discount,
            total: subtotal - discount,
            offer_id: None,
        })
    }

    /// Applies the offer's percentage and records which offer it was.
    pub fn with_offer(
        hourly_rate: i64,
        hours: u32,
        offer: Option<&Offer>,
    ) -> Result<Self, BookingError> {
        let pct = offer.map_or(0, |o| o.discount_percentage);
        let mut quote = Self::compute(hourly_rate, hours, pct)?;
        quote.offer_id = offer.map(|o| o.id);
        Ok(quote)
    }
}

/// The applicable offer with the largest discount, if any.
pub fn best_offer(offers: &[Offer], now: DateTime<Utc>) -> Option<&Offer> {
    offers
        .iter()
        .filter(|o| o.applies_at(now))
        .max_by_key(|o| o.discount_percentage)
}
