//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations live in
//! `charter-db`; services in `charter-booking` and `charter-auth` are
//! generic over these traits.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::CharterResult;
use crate::models::{
    offer::{CreateOffer, Offer},
    otp::{CreateOtpChallenge, OtpChallenge},
    reservation::{CreateReservation, Reservation, ReservationStatus},
    user::{CreateUser, UpdateUser, User},
    yacht::{CreateYacht, Yacht},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Fleet
// ---------------------------------------------------------------------------

pub trait YachtRepository: Send + Sync {
    fn create(&self, input: CreateYacht) -> impl Future<Output = CharterResult<Yacht>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CharterResult<Yacht>> + Send;
}

pub trait OfferRepository: Send + Sync {
    fn create(&self, input: CreateOffer) -> impl Future<Output = CharterResult<Offer>> + Send;
    /// Offers for the yacht that are active and whose validity window
    /// contains `now`.
    fn list_active(
        &self,
        yacht_id: Uuid,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CharterResult<Vec<Offer>>> + Send;
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

pub trait ReservationRepository: Send + Sync {
    fn list_for_day(
        &self,
        yacht_id: Uuid,
        date: NaiveDate,
        statuses: &[ReservationStatus],
    ) -> impl Future<Output = CharterResult<Vec<Reservation>>> + Send;

    /// Writes a `pending` reservation. The overlap check against
    /// occupying reservations of the same yacht and day runs in the
    /// same transaction as the insert; a clash yields
    /// `CharterError::Conflict`.
    fn create(
        &self,
        input: CreateReservation,
    ) -> impl Future<Output = CharterResult<Reservation>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CharterResult<Reservation>> + Send;

    fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> impl Future<Output = CharterResult<Reservation>> + Send;

    /// Newest booking date first.
    fn list_by_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CharterResult<PaginatedResult<Reservation>>> + Send;
}

// ---------------------------------------------------------------------------
// Accounts & one-time codes
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CharterResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CharterResult<User>> + Send;
    /// Emails are matched case-insensitively.
    fn find_by_email(&self, email: &str)
    -> impl Future<Output = CharterResult<Option<User>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = CharterResult<User>> + Send;
}

pub trait OtpRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOtpChallenge,
    ) -> impl Future<Output = CharterResult<OtpChallenge>> + Send;

    /// Most recent unused challenge for `(email, code)` that has not
    /// expired at `now`.
    fn find_latest_valid(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = CharterResult<Option<OtpChallenge>>> + Send;

    /// Flip an unused challenge to used in one statement. `false` when
    /// it was already used or does not exist.
    fn mark_used(&self, id: Uuid) -> impl Future<Output = CharterResult<bool>> + Send;
}
