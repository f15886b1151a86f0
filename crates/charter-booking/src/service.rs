//! Booking service: availability, quotes and reservation writes.

use charter_core::error::{CharterError, CharterResult};
use charter_core::models::reservation::{
    BookedInterval, CreateReservation, Reservation, ReservationStatus,
};
use charter_core::models::session::Session;
use charter_core::repository::{
    OfferRepository, PaginatedResult, Pagination, ReservationRepository, YachtRepository,
};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::draft::BookingDraft;
use crate::error::BookingError;
use crate::pricing::{self, Quote};
use crate::slots::{self, BASE_TIME_SLOTS, DayAvailability};

/// Booking service.
///
/// Generic over repository implementations so that the booking layer
/// has no dependency on the database crate.
pub struct BookingService<Y: YachtRepository, O: OfferRepository, R: ReservationRepository> {
    yacht_repo: Y,
    offer_repo: O,
    reservation_repo: R,
    config: BookingConfig,
}

impl<Y: YachtRepository, O: OfferRepository, R: ReservationRepository> BookingService<Y, O, R> {
    pub fn new(
        yacht_repo: Y,
        offer_repo: O,
        reservation_repo: R,
        config: BookingConfig,
    ) -> Result<Self, BookingError> {
        config.validate()?;
        Ok(Self {
            yacht_repo,
            offer_repo,
            reservation_repo,
            config,
        })
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    /// A fresh draft for the yacht with the configured default duration.
    pub fn new_draft(&self, yacht_id: Uuid) -> Result<BookingDraft, BookingError> {
        BookingDraft::new(yacht_id, self.config.default_duration_hours)
    }

    /// Which base start times are free on `date` for `duration_hours`.
    pub async fn availability(
        &self,
        yacht_id: Uuid,
        date: NaiveDate,
        duration_hours: u32,
    ) -> CharterResult<DayAvailability> {
        slots::validate_duration(duration_hours)?;
        let booked = self.booked_intervals(yacht_id, date).await?;
        Ok(slots::availability(
            &booked,
            duration_hours,
            &BASE_TIME_SLOTS,
        )?)
    }

    /// Price for `duration_hours` on the yacht, discounted by the best
    /// offer applicable at `now`.
    pub async fn quote(
        &self,
        yacht_id: Uuid,
        duration_hours: u32,
        now: DateTime<Utc>,
    ) -> CharterResult<Quote> {
        slots::validate_duration(duration_hours)?;
        let yacht = self.yacht_repo.get_by_id(yacht_id).await?;
        let offers = self.offer_repo.list_active(yacht_id, now).await?;
        let offer = pricing::best_offer(&offers, now);
        Ok(Quote::with_offer(yacht.hourly_price, duration_hours, offer)?)
    }

    /// Write the draft as a `pending` reservation.
    ///
    /// The selected slot is checked again against freshly listed
    /// reservations; the store still has the final word and a clash
    /// there surfaces as [`CharterError::Conflict`].
    pub async fn submit(
        &self,
        draft: &BookingDraft,
        session: Option<&Session>,
        now: DateTime<Utc>,
    ) -> CharterResult<Reservation> {
        let date = draft.date().ok_or(BookingError::MissingDate)?;
        let start_hour = draft.selected_start().ok_or(BookingError::MissingSlot)?;
        if date < now.date_naive() {
            return Err(BookingError::PastDate.into());
        }
        let (guest_name, guest_email) = contact_for(draft, session)?;

        let day = self
            .availability(draft.yacht_id(), date, draft.duration_hours())
            .await?;
        if day.is_blocked(start_hour) {
            return Err(BookingError::SlotUnavailable(start_hour).into());
        }

        let quote = self
            .quote(draft.yacht_id(), draft.duration_hours(), now)
            .await?;

        let phone = draft.guest_phone.trim();
        let result = self
            .reservation_repo
            .create(CreateReservation {
                yacht_id: draft.yacht_id(),
                user_id: session.map(|s| s.user_id),
                booking_date: date,
                start_hour,
                duration_hours: draft.duration_hours(),
                total_price: quote.total,
                offer_id: quote.offer_id,
                guest_name,
                guest_email,
                guest_phone: (!phone.is_empty()).then(|| phone.to_string()),
            })
            .await;

        match result {
            Ok(reservation) => {
                info!(
                    reservation_id = %reservation.id,
                    yacht_id = %reservation.yacht_id,
                    date = %reservation.booking_date,
                    start_hour,
                    duration_hours = draft.duration_hours(),
                    total = reservation.total_price,
                    "Reservation submitted"
                );
                Ok(reservation)
            }
            Err(CharterError::Conflict { message }) => {
                warn!(
                    yacht_id = %draft.yacht_id(),
                    date = %date,
                    start_hour,
                    "Reservation rejected by store overlap check"
                );
                Err(CharterError::Conflict { message })
            }
            Err(e) => Err(e),
        }
    }

    /// Customer cancellation: only their own reservation, only while
    /// it is still `pending`.
    pub async fn cancel(
        &self,
        reservation_id: Uuid,
        session: &Session,
    ) -> CharterResult<Reservation> {
        let reservation = self.reservation_repo.get_by_id(reservation_id).await?;
        if reservation.user_id != Some(session.user_id) {
            return Err(BookingError::NotPermitted("not your reservation".into()).into());
        }
        if reservation.status != ReservationStatus::Pending {
            return Err(BookingError::InvalidTransition {
                from: reservation.status,
                to: ReservationStatus::Cancelled,
            }
            .into());
        }

        let updated = self
            .reservation_repo
            .update_status(reservation_id, ReservationStatus::Cancelled)
            .await?;
        info!(
            reservation_id = %reservation_id,
            user_id = %session.user_id,
            "Reservation cancelled by customer"
        );
        Ok(updated)
    }

    /// Administrative status change following the reservation lifecycle.
    pub async fn update_status(
        &self,
        reservation_id: Uuid,
        status: ReservationStatus,
        session: &Session,
    ) -> CharterResult<Reservation> {
        if !session.role.is_admin() {
            return Err(BookingError::NotPermitted("administrators only".into()).into());
        }
        let reservation = self.reservation_repo.get_by_id(reservation_id).await?;
        if !reservation.status.can_transition_to(status) {
            return Err(BookingError::InvalidTransition {
                from: reservation.status,
                to: status,
            }
            .into());
        }

        let updated = self
            .reservation_repo
            .update_status(reservation_id, status)
            .await?;
        info!(
            reservation_id = %reservation_id,
            from = %reservation.status,
            to = %status,
            admin_id = %session.user_id,
            "Reservation status updated"
        );
        Ok(updated)
    }

    /// One page of the signed-in customer's reservations, newest date
    /// first. `None` asks for the first page of `history_page_size`.
    pub async fn list_for_user(
        &self,
        session: &Session,
        page: Option<Pagination>,
    ) -> CharterResult<PaginatedResult<Reservation>> {
        let page = page.unwrap_or(Pagination {
            offset: 0,
            limit: self.config.history_page_size,
        });
        self.reservation_repo
            .list_by_user(session.user_id, page)
            .await
    }

    async fn booked_intervals(
        &self,
        yacht_id: Uuid,
        date: NaiveDate,
    ) -> CharterResult<Vec<BookedInterval>> {
        let reservations = self
            .reservation_repo
            .list_for_day(yacht_id, date, &ReservationStatus::OCCUPYING)
            .await?;
        Ok(reservations.iter().map(Reservation::interval).collect())
    }
}

/// Contact details for the reservation. Guests must supply name and
/// email; signed-in customers fall back to their account details.
fn contact_for(
    draft: &BookingDraft,
    session: Option<&Session>,
) -> Result<(String, String), BookingError> {
    let name = draft.guest_name.trim();
    let email = draft.guest_email.trim();
    match session {
        Some(session) => {
            let name = if name.is_empty() {
                session.first_name.clone().unwrap_or_default()
            } else {
                name.to_string()
            };
            let email = if email.is_empty() {
                session.email.clone()
            } else {
                email.to_string()
            };
            Ok((name, email))
        }
        None if name.is_empty() || email.is_empty() => Err(BookingError::MissingContact),
        None => Ok((name.to_string(), email.to_string())),
    }
}
