//! Integration tests for the booking service against an in-memory store.

use charter_booking::config::BookingConfig;
use charter_booking::error::BookingError;
use charter_booking::service::BookingService;
use charter_core::error::CharterError;
use charter_core::models::offer::CreateOffer;
use charter_core::models::reservation::{CreateReservation, ReservationStatus};
use charter_core::models::role::Role;
use charter_core::models::session::Session;
use charter_core::models::yacht::{CreateYacht, Yacht};
use charter_core::repository::{
    OfferRepository, Pagination, ReservationRepository, YachtRepository,
};
use charter_db::repository::{
    SurrealOfferRepository, SurrealReservationRepository, SurrealYachtRepository,
};
use chrono::{Duration, NaiveDate, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Service = BookingService<
    SurrealYachtRepository<Db>,
    SurrealOfferRepository<Db>,
    SurrealReservationRepository<Db>,
>;

struct Harness {
    service: Service,
    yachts: SurrealYachtRepository<Db>,
    offers: SurrealOfferRepository<Db>,
    reservations: SurrealReservationRepository<Db>,
}

async fn setup() -> Harness {
    setup_with(BookingConfig::default()).await
}

async fn setup_with(config: BookingConfig) -> Harness {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    charter_db::run_migrations(&db).await.unwrap();

    Harness {
        service: BookingService::new(
            SurrealYachtRepository::new(db.clone()),
            SurrealOfferRepository::new(db.clone()),
            SurrealReservationRepository::new(db.clone()),
            config,
        )
        .unwrap(),
        yachts: SurrealYachtRepository::new(db.clone()),
        offers: SurrealOfferRepository::new(db.clone()),
        reservations: SurrealReservationRepository::new(db),
    }
}

impl Harness {
    async fn yacht(&self, hourly_price: i64) -> Yacht {
        self.yachts
            .create(CreateYacht {
                name: "Sea Breeze".into(),
                hourly_price,
            })
            .await
            .unwrap()
    }

    async fn book(&self, yacht_id: Uuid, date: NaiveDate, start_hour: u32, hours: u32) {
        self.reservations
            .create(CreateReservation {
                yacht_id,
                user_id: None,
                booking_date: date,
                start_hour,
                duration_hours: hours,
                total_price: 0,
                offer_id: None,
                guest_name: "Existing".into(),
                guest_email: "existing@example.com".into(),
                guest_phone: None,
            })
            .await
            .unwrap();
    }
}

fn next_week() -> NaiveDate {
    (Utc::now() + Duration::days(7)).date_naive()
}

fn session(role: Role) -> Session {
    Session {
        user_id: Uuid::new_v4(),
        email: "ada@example.com".into(),
        role,
        is_verified: true,
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
    }
}

fn blocked(day: &charter_booking::DayAvailability) -> Vec<u32> {
    day.slots
        .iter()
        .filter(|s| s.blocked)
        .map(|s| s.start_hour)
        .collect()
}

#[tokio::test]
async fn touching_intervals_stay_bookable() {
    let h = setup().await;
    let yacht = h.yacht(100_000).await;
    let date = next_week();
    h.book(yacht.id, date, 9, 3).await;

    let day = h.service.availability(yacht.id, date, 3).await.unwrap();
    assert_eq!(blocked(&day), vec![9]);
    assert!(!day.is_blocked(6));
    assert!(!day.is_blocked(12));
}

#[tokio::test]
async fn long_charters_block_every_overlapping_start() {
    let h = setup().await;
    let yacht = h.yacht(100_000).await;
    let date = next_week();
    h.book(yacht.id, date, 19, 2).await;

    let day = h.service.availability(yacht.id, date, 10).await.unwrap();
    assert_eq!(blocked(&day), vec![12, 15, 19]);
    assert!(!day.all_blocked);
    assert!(day.slot(22).unwrap().crosses_midnight);
}

#[tokio::test]
async fn other_days_and_yachts_do_not_interfere() {
    let h = setup().await;
    let yacht = h.yacht(100_000).await;
    let other = h.yacht(100_000).await;
    let date = next_week();
    h.book(other.id, date, 9, 3).await;
    h.book(yacht.id, date + Duration::days(1), 9, 3).await;

    let day = h.service.availability(yacht.id, date, 3).await.unwrap();
    assert!(blocked(&day).is_empty());
}

#[tokio::test]
async fn quote_applies_the_best_current_offer() {
    let h = setup().await;
    let yacht = h.yacht(1_000).await;
    let now = Utc::now();
    for pct in [10, 20] {
        h.offers
            .create(CreateOffer {
                yacht_id: yacht.id,
                discount_percentage: pct,
                description: None,
                valid_from: now - Duration::days(1),
                valid_until: now + Duration::days(1),
                is_active: true,
            })
            .await
            .unwrap();
    }

    let quote = h.service.quote(yacht.id, 4, now).await.unwrap();
    assert_eq!(quote.subtotal, 4_000);
    assert_eq!(quote.discount, 800);
    assert_eq!(quote.total, 3_200);
    assert!(quote.offer_id.is_some());
}

#[tokio::test]
async fn guest_submission_writes_a_pending_reservation() {
    let h = setup().await;
    let yacht = h.yacht(150_000).await;
    let date = next_week();

    let mut draft = h.service.new_draft(yacht.id).unwrap();
    draft.set_date(date);
    draft.set_duration(4).unwrap();
    let day = h.service.availability(yacht.id, date, 4).await.unwrap();
    draft.select_slot(12, &day).unwrap();
    draft.guest_name = "Grace Hopper".into();
    draft.guest_email = "grace@example.com".into();

    let reservation = h.service.submit(&draft, None, Utc::now()).await.unwrap();
    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(reservation.start_hour, 12);
    assert_eq!(reservation.duration_hours, Some(4));
    assert_eq!(reservation.total_price, 600_000);
    assert_eq!(reservation.user_id, None);
    assert_eq!(reservation.guest_phone, None);

    let day = h.service.availability(yacht.id, date, 4).await.unwrap();
    assert!(day.is_blocked(12));
}

#[tokio::test]
async fn guest_submission_needs_contact_details() {
    let h = setup().await;
    let yacht = h.yacht(150_000).await;
    let date = next_week();

    let mut draft = h.service.new_draft(yacht.id).unwrap();
    draft.set_date(date);
    let day = h.service.availability(yacht.id, date, draft.duration_hours()).await.unwrap();
    draft.select_slot(6, &day).unwrap();

    let err = h.service.submit(&draft, None, Utc::now()).await.unwrap_err();
    assert!(matches!(err, CharterError::Validation { .. }));
}

#[tokio::test]
async fn second_submission_for_the_same_slot_conflicts() {
    let h = setup().await;
    let yacht = h.yacht(150_000).await;
    let date = next_week();
    let day = h.service.availability(yacht.id, date, 3).await.unwrap();

    let mut first = h.service.new_draft(yacht.id).unwrap();
    first.set_date(date);
    first.select_slot(9, &day).unwrap();
    let mut second = first.clone();
    second.set_duration(4).unwrap();
    let day4 = h.service.availability(yacht.id, date, 4).await.unwrap();
    second.select_slot(6, &day4).unwrap();

    let customer = session(Role::User);
    h.service.submit(&first, Some(&customer), Utc::now()).await.unwrap();

    let err = h
        .service
        .submit(&second, Some(&customer), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, CharterError::Conflict { .. }));
}

#[tokio::test]
async fn store_rejects_overlap_the_preview_missed() {
    let h = setup().await;
    let yacht = h.yacht(150_000).await;
    let date = next_week();
    h.book(yacht.id, date, 12, 3).await;

    let err = h
        .reservations
        .create(CreateReservation {
            yacht_id: yacht.id,
            user_id: None,
            booking_date: date,
            start_hour: 13,
            duration_hours: 2,
            total_price: 0,
            offer_id: None,
            guest_name: "Late".into(),
            guest_email: "late@example.com".into(),
            guest_phone: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CharterError::Conflict { .. }));
}

#[tokio::test]
async fn past_dates_are_rejected() {
    let h = setup().await;
    let yacht = h.yacht(150_000).await;
    let yesterday = (Utc::now() - Duration::days(1)).date_naive();

    let mut draft = h.service.new_draft(yacht.id).unwrap();
    draft.set_date(yesterday);
    let day = h.service.availability(yacht.id, yesterday, 3).await.unwrap();
    draft.select_slot(9, &day).unwrap();

    let err = h
        .service
        .submit(&draft, Some(&session(Role::User)), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, CharterError::Validation { .. }));
}

#[tokio::test]
async fn invalid_durations_are_rejected() {
    let h = setup().await;
    let yacht = h.yacht(150_000).await;
    for hours in [0, 1, 11] {
        let err = h
            .service
            .availability(yacht.id, next_week(), hours)
            .await
            .unwrap_err();
        assert!(matches!(err, CharterError::Validation { .. }), "{hours}h");
    }
}

#[tokio::test]
async fn customers_cancel_only_their_own_pending_reservations() {
    let h = setup().await;
    let yacht = h.yacht(150_000).await;
    let date = next_week();
    let owner = session(Role::User);
    let stranger = session(Role::User);

    let mut draft = h.service.new_draft(yacht.id).unwrap();
    draft.set_date(date);
    let day = h.service.availability(yacht.id, date, 3).await.unwrap();
    draft.select_slot(15, &day).unwrap();
    let reservation = h.service.submit(&draft, Some(&owner), Utc::now()).await.unwrap();
    assert_eq!(reservation.guest_email, "ada@example.com");

    let err = h.service.cancel(reservation.id, &stranger).await.unwrap_err();
    assert!(matches!(err, CharterError::AuthorizationDenied { .. }));

    let cancelled = h.service.cancel(reservation.id, &owner).await.unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);

    let err = h.service.cancel(reservation.id, &owner).await.unwrap_err();
    assert!(matches!(err, CharterError::Validation { .. }));

    let day = h.service.availability(yacht.id, date, 3).await.unwrap();
    assert!(!day.is_blocked(15));
}

#[tokio::test]
async fn admins_move_reservations_through_the_lifecycle() {
    let h = setup().await;
    let yacht = h.yacht(150_000).await;
    let date = next_week();
    let customer = session(Role::User);
    let admin = session(Role::Admin);

    let mut draft = h.service.new_draft(yacht.id).unwrap();
    draft.set_date(date);
    let day = h.service.availability(yacht.id, date, 3).await.unwrap();
    draft.select_slot(6, &day).unwrap();
    let reservation = h.service.submit(&draft, Some(&customer), Utc::now()).await.unwrap();

    let err = h
        .service
        .update_status(reservation.id, ReservationStatus::Confirmed, &customer)
        .await
        .unwrap_err();
    assert!(matches!(err, CharterError::AuthorizationDenied { .. }));

    let confirmed = h
        .service
        .update_status(reservation.id, ReservationStatus::Confirmed, &admin)
        .await
        .unwrap();
    assert_eq!(confirmed.status, ReservationStatus::Confirmed);

    let err = h.service.cancel(reservation.id, &customer).await.unwrap_err();
    assert!(matches!(err, CharterError::Validation { .. }));

    let err = h
        .service
        .update_status(reservation.id, ReservationStatus::Pending, &admin)
        .await
        .unwrap_err();
    assert!(matches!(err, CharterError::Validation { .. }));

    let completed = h
        .service
        .update_status(reservation.id, ReservationStatus::Completed, &admin)
        .await
        .unwrap();
    assert_eq!(completed.status, ReservationStatus::Completed);

    let day = h.service.availability(yacht.id, date, 3).await.unwrap();
    assert!(!day.is_blocked(6));
}

#[tokio::test]
async fn history_lists_only_the_customers_reservations() {
    let h = setup().await;
    let yacht = h.yacht(150_000).await;
    let date = next_week();
    let ada = session(Role::User);
    let grace = session(Role::User);

    for (start, who, day_offset) in [(6, &ada, 0), (12, &ada, 1), (9, &grace, 0)] {
        let day_date = date + Duration::days(day_offset);
        let mut draft = h.service.new_draft(yacht.id).unwrap();
        draft.set_date(day_date);
        let day = h.service.availability(yacht.id, day_date, 3).await.unwrap();
        draft.select_slot(start, &day).unwrap();
        h.service.submit(&draft, Some(who), Utc::now()).await.unwrap();
    }

    let history = h.service.list_for_user(&ada, None).await.unwrap();
    assert_eq!(history.total, 2);
    assert_eq!(history.items.len(), 2);
    assert!(history.items.iter().all(|r| r.user_id == Some(ada.user_id)));
    assert_eq!(history.items[0].booking_date, date + Duration::days(1));
}

#[tokio::test]
async fn history_pages_past_the_configured_size() {
    let h = setup_with(BookingConfig {
        history_page_size: 2,
        ..Default::default()
    })
    .await;
    let yacht = h.yacht(150_000).await;
    let date = next_week();
    let ada = session(Role::User);

    for day_offset in 0..3 {
        let day_date = date + Duration::days(day_offset);
        let mut draft = h.service.new_draft(yacht.id).unwrap();
        draft.set_date(day_date);
        let day = h.service.availability(yacht.id, day_date, 3).await.unwrap();
        draft.select_slot(9, &day).unwrap();
        h.service.submit(&draft, Some(&ada), Utc::now()).await.unwrap();
    }

    let first = h.service.list_for_user(&ada, None).await.unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].booking_date, date + Duration::days(2));

    let rest = h
        .service
        .list_for_user(
            &ada,
            Some(Pagination {
                offset: 2,
                limit: 2,
            }),
        )
        .await
        .unwrap();
    assert_eq!(rest.total, 3);
    assert_eq!(rest.items.len(), 1);
    assert_eq!(rest.items[0].booking_date, date);
}

#[tokio::test]
async fn out_of_range_default_duration_is_refused() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    let result = BookingService::new(
        SurrealYachtRepository::new(db.clone()),
        SurrealOfferRepository::new(db.clone()),
        SurrealReservationRepository::new(db),
        BookingConfig {
            default_duration_hours: 12,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(BookingError::InvalidDuration { hours: 12, .. })));
}
