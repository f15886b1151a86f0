//! Booking configuration.

use serde::Deserialize;

use crate::error::BookingError;
use crate::slots;

/// Configuration for the booking service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Duration preselected in a fresh draft (default: 3 hours).
    pub default_duration_hours: u32,
    /// ISO 4217 code of the currency prices are kept in.
    pub currency: String,
    /// Page size used when listing a customer's reservations.
    pub history_page_size: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_duration_hours: 3,
            currency: "AED".into(),
            history_page_size: 50,
        }
    }
}

impl BookingConfig {
    /// Reject a default duration outside the bookable range or an empty
    /// history page.
    pub fn validate(&self) -> Result<(), BookingError> {
        slots::validate_duration(self.default_duration_hours)?;
        if self.history_page_size == 0 {
            return Err(BookingError::InvalidConfig(
                "history_page_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
