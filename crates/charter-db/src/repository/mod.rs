//! SurrealDB repository implementations.

mod offer;
mod otp;
mod reservation;
mod user;
mod yacht;

pub use offer::SurrealOfferRepository;
pub use otp::SurrealOtpRepository;
pub use reservation::SurrealReservationRepository;
pub use user::SurrealUserRepository;
pub use yacht::SurrealYachtRepository;

use uuid::Uuid;

use crate::error::DbError;

/// UUIDs are stored as strings; a bad one means a corrupted record.
fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_optional_uuid(value: Option<&str>, what: &str) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(v, what)).transpose()
}
