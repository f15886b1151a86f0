//! Charter Booking: time-slot conflict engine, price computation and
//! the booking service that writes reservations through the store.

pub mod config;
pub mod draft;
pub mod error;
pub mod pricing;
pub mod service;
pub mod slots;

pub use config::BookingConfig;
pub use draft::BookingDraft;
pub use error::BookingError;
pub use pricing::Quote;
pub use service::BookingService;
pub use slots::{BASE_TIME_SLOTS, CandidateSlot, DayAvailability, SlotState};
