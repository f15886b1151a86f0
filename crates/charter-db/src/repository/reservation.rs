//! SurrealDB implementation of [`ReservationRepository`].
//!
//! Dates are stored as `YYYY-MM-DD` strings. `end_hour` is stored
//! alongside the start so the overlap check is a plain range
//! comparison; it is not wrapped at midnight.

use charter_core::error::CharterResult;
use charter_core::models::reservation::{CreateReservation, Reservation, ReservationStatus};
use charter_core::repository::{PaginatedResult, Pagination, ReservationRepository};
use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, SLOT_CONFLICT};

use super::{parse_optional_uuid, parse_uuid};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check and insert run as one statement, hence in one transaction:
/// a concurrent writer cannot slip an overlapping reservation in
/// between.
const INSERT_IF_FREE: &str = "\
IF array::len((SELECT VALUE id FROM reservation \
    WHERE yacht_id = $yacht_id AND booking_date = $booking_date \
    AND status IN ['pending', 'confirmed'] \
    AND start_hour < $end_hour AND end_hour > $start_hour)) > 0 { \
    THROW $conflict; \
} ELSE { \
    CREATE type::record('reservation', $id) SET \
        yacht_id = $yacht_id, user_id = $user_id, \
        booking_date = $booking_date, start_hour = $start_hour, \
        duration_hours = $duration_hours, end_hour = $end_hour, \
        total_price = $total_price, offer_id = $offer_id, \
        guest_name = $guest_name, guest_email = $guest_email, \
        guest_phone = $guest_phone, status = 'pending'; \
};";

#[derive(Debug, SurrealValue)]
struct ReservationRow {
    yacht_id: String,
    user_id: Option<String>,
    booking_date: String,
    start_hour: u32,
    duration_hours: Option<u32>,
    total_price: i64,
    offer_id: Option<String>,
    guest_name: String,
    guest_email: String,
    guest_phone: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ReservationRowWithId {
    record_id: String,
    yacht_id: String,
    user_id: Option<String>,
    booking_date: String,
    start_hour: u32,
    duration_hours: Option<u32>,
    total_price: i64,
    offer_id: Option<String>,
    guest_name: String,
    guest_email: String,
    guest_phone: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

impl ReservationRow {
    fn into_reservation(self, id: Uuid) -> Result<Reservation, DbError> {
        let booking_date = NaiveDate::parse_from_str(&self.booking_date, DATE_FORMAT)
            .map_err(|e| DbError::Decode(format!("invalid booking date: {e}")))?;
        let status = ReservationStatus::parse(&self.status)
            .ok_or_else(|| DbError::Decode(format!("unknown status: {}", self.status)))?;
        Ok(Reservation {
            id,
            yacht_id: parse_uuid(&self.yacht_id, "yacht")?,
            user_id: parse_optional_uuid(self.user_id.as_deref(), "user")?,
            booking_date,
            start_hour: self.start_hour,
            duration_hours: self.duration_hours,
            total_price: self.total_price,
            offer_id: parse_optional_uuid(self.offer_id.as_deref(), "offer")?,
            guest_name: self.guest_name,
            guest_email: self.guest_email,
            guest_phone: self.guest_phone,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ReservationRowWithId {
    fn try_into_reservation(self) -> Result<Reservation, DbError> {
        let id = parse_uuid(&self.record_id, "reservation")?;
        ReservationRow {
            yacht_id: self.yacht_id,
            user_id: self.user_id,
            booking_date: self.booking_date,
            start_hour: self.start_hour,
            duration_hours: self.duration_hours,
            total_price: self.total_price,
            offer_id: self.offer_id,
            guest_name: self.guest_name,
            guest_email: self.guest_email,
            guest_phone: self.guest_phone,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_reservation(id)
    }
}

/// SurrealDB implementation of the Reservation repository.
#[derive(Clone)]
pub struct SurrealReservationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReservationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ReservationRepository for SurrealReservationRepository<C> {
    async fn list_for_day(
        &self,
        yacht_id: Uuid,
        date: NaiveDate,
        statuses: &[ReservationStatus],
    ) -> CharterResult<Vec<Reservation>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM reservation \
                 WHERE yacht_id = $yacht_id AND booking_date = $booking_date \
                 AND status IN $statuses \
                 ORDER BY start_hour ASC",
            )
            .bind(("yacht_id", yacht_id.to_string()))
            .bind(("booking_date", date.format(DATE_FORMAT).to_string()))
            .bind(("statuses", statuses))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReservationRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_reservation())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn create(&self, input: CreateReservation) -> CharterResult<Reservation> {
        let id = Uuid::new_v4();
        let interval = input.interval();

        self.db
            .query(INSERT_IF_FREE)
            .bind(("id", id.to_string()))
            .bind(("conflict", SLOT_CONFLICT))
            .bind(("yacht_id", input.yacht_id.to_string()))
            .bind(("user_id", input.user_id.map(|u| u.to_string())))
            .bind(("booking_date", input.booking_date.format(DATE_FORMAT).to_string()))
            .bind(("start_hour", interval.start_hour))
            .bind(("duration_hours", interval.duration()))
            .bind(("end_hour", interval.end_hour()))
            .bind(("total_price", input.total_price))
            .bind(("offer_id", input.offer_id.map(|o| o.to_string())))
            .bind(("guest_name", input.guest_name))
            .bind(("guest_email", input.guest_email))
            .bind(("guest_phone", input.guest_phone))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| {
                let err = DbError::from_statement("reservation", e);
                if matches!(err, DbError::SlotConflict) {
                    debug!(
                        yacht_id = %input.yacht_id,
                        date = %input.booking_date,
                        start_hour = interval.start_hour,
                        "Overlapping reservation rejected"
                    );
                }
                err
            })?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> CharterResult<Reservation> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('reservation', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReservationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "reservation".into(),
            id: id_str,
        })?;

        Ok(row.into_reservation(id)?)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> CharterResult<Reservation> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('reservation', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("reservation", e))?;

        let rows: Vec<ReservationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "reservation".into(),
            id: id_str,
        })?;

        Ok(row.into_reservation(id)?)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> CharterResult<PaginatedResult<Reservation>> {
        let user_id_str = user_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM reservation \
                 WHERE user_id = $user_id GROUP ALL",
            )
            .bind(("user_id", user_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM reservation \
                 WHERE user_id = $user_id \
                 ORDER BY booking_date DESC, start_hour DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("user_id", user_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReservationRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_reservation())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
