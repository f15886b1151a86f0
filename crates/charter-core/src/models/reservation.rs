//! Reservation model and its status lifecycle.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Duration assumed for a stored reservation whose duration is unset.
pub const DEFAULT_DURATION_HOURS: u32 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Statuses whose reservations hold their time window.
    pub const OCCUPYING: [ReservationStatus; 2] =
        [ReservationStatus::Pending, ReservationStatus::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" => Some(ReservationStatus::Confirmed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            "completed" => Some(ReservationStatus::Completed),
            _ => None,
        }
    }

    pub fn occupies_slot(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Cancelled | ReservationStatus::Completed
        )
    }

    /// Administrative transitions. `cancelled` and `completed` are terminal.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The time window a reservation occupies on its day, in whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start_hour: u32,
    pub duration_hours: Option<u32>,
}

impl BookedInterval {
    pub fn new(start_hour: u32, duration_hours: Option<u32>) -> Self {
        Self {
            start_hour,
            duration_hours,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration_hours.unwrap_or(DEFAULT_DURATION_HOURS)
    }

    /// Exclusive end hour. May exceed 24; there is no wraparound.
    pub fn end_hour(&self) -> u32 {
        self.start_hour + self.duration()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub yacht_id: Uuid,
    pub user_id: Option<Uuid>,
    pub booking_date: NaiveDate,
    pub start_hour: u32,
    pub duration_hours: Option<u32>,
    /// Minor currency units, after discount.
    pub total_price: i64,
    pub offer_id: Option<Uuid>,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn interval(&self) -> BookedInterval {
        BookedInterval::new(self.start_hour, self.duration_hours)
    }
}

/// New reservations are always written as `pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservation {
    pub yacht_id: Uuid,
    pub user_id: Option<Uuid>,
    pub booking_date: NaiveDate,
    pub start_hour: u32,
    pub duration_hours: u32,
    pub total_price: i64,
    pub offer_id: Option<Uuid>,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
}

impl CreateReservation {
    pub fn interval(&self) -> BookedInterval {
        BookedInterval::new(self.start_hour, Some(self.duration_hours))
    }
}
