//! Integration tests for the Yacht and Offer repositories.

use charter_core::models::offer::CreateOffer;
use charter_core::models::yacht::CreateYacht;
use charter_core::repository::{OfferRepository, YachtRepository};
use charter_db::repository::{SurrealOfferRepository, SurrealYachtRepository};
use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> (SurrealYachtRepository<Db>, SurrealOfferRepository<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    charter_db::run_migrations(&db).await.unwrap();
    (
        SurrealYachtRepository::new(db.clone()),
        SurrealOfferRepository::new(db),
    )
}

#[tokio::test]
async fn create_and_get_yacht() {
    let (yachts, _) = setup().await;
    let yacht = yachts
        .create(CreateYacht {
            name: "Sea Breeze".into(),
            hourly_price: 150_000,
        })
        .await
        .unwrap();
    assert!(yacht.is_active);

    let fetched = yachts.get_by_id(yacht.id).await.unwrap();
    assert_eq!(fetched.name, "Sea Breeze");
    assert_eq!(fetched.hourly_price, 150_000);
}

#[tokio::test]
async fn list_active_filters_by_window_and_flag() {
    let (yachts, offers) = setup().await;
    let yacht = yachts
        .create(CreateYacht {
            name: "Sea Breeze".into(),
            hourly_price: 150_000,
        })
        .await
        .unwrap();
    let now = Utc::now();

    let offer = |pct: u32, from: Duration, until: Duration, active: bool| CreateOffer {
        yacht_id: yacht.id,
        discount_percentage: pct,
        description: Some(format!("{pct}% off")),
        valid_from: now + from,
        valid_until: now + until,
        is_active: active,
    };

    offers
        .create(offer(10, -Duration::days(1), Duration::days(1), true))
        .await
        .unwrap();
    offers
        .create(offer(30, -Duration::days(1), Duration::days(1), true))
        .await
        .unwrap();
    offers
        .create(offer(50, -Duration::days(1), Duration::days(1), false))
        .await
        .unwrap();
    offers
        .create(offer(40, Duration::days(2), Duration::days(5), true))
        .await
        .unwrap();
    offers
        .create(offer(60, -Duration::days(5), -Duration::days(2), true))
        .await
        .unwrap();

    let active = offers.list_active(yacht.id, now).await.unwrap();
    let pcts: Vec<u32> = active.iter().map(|o| o.discount_percentage).collect();
    assert_eq!(pcts, vec![30, 10]);
}

#[tokio::test]
async fn out_of_range_discount_is_rejected() {
    let (_, offers) = setup().await;
    let now = Utc::now();
    let result = offers
        .create(CreateOffer {
            yacht_id: uuid::Uuid::new_v4(),
            discount_percentage: 120,
            description: None,
            valid_from: now,
            valid_until: now + Duration::days(1),
            is_active: true,
        })
        .await;
    assert!(result.is_err());
}
