//! Booking error types.

use charter_core::error::CharterError;
use charter_core::models::reservation::ReservationStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("duration must be between {min} and {max} hours, got {hours}")]
    InvalidDuration { hours: u32, min: u32, max: u32 },

    #[error("{0:02}:00 is not an offered start time")]
    UnknownSlot(u32),

    #[error("the {0:02}:00 slot is no longer available, please pick another time")]
    SlotUnavailable(u32),

    #[error("availability was computed for a different duration")]
    StaleAvailability,

    #[error("please select a date")]
    MissingDate,

    #[error("please select a time slot")]
    MissingSlot,

    #[error("bookings cannot be made for a past date")]
    PastDate,

    #[error("name and email are required to book without an account")]
    MissingContact,

    #[error("invalid price input: {0}")]
    InvalidPrice(String),

    #[error("cannot move a reservation from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("not permitted: {0}")]
    NotPermitted(String),

    #[error("invalid booking configuration: {0}")]
    InvalidConfig(String),
}

impl From<BookingError> for CharterError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SlotUnavailable(_) => CharterError::Conflict {
                message: err.to_string(),
            },
            BookingError::NotPermitted(_) => CharterError::AuthorizationDenied {
                reason: err.to_string(),
            },
            _ => CharterError::Validation {
                message: err.to_string(),
            },
        }
    }
}
