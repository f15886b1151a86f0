//! SurrealDB implementation of [`OfferRepository`].

use charter_core::error::CharterResult;
use charter_core::models::offer::{CreateOffer, Offer};
use charter_core::repository::OfferRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

use super::parse_uuid;

#[derive(Debug, SurrealValue)]
struct OfferRow {
    yacht_id: String,
    discount_percentage: u32,
    description: Option<String>,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct OfferRowWithId {
    record_id: String,
    yacht_id: String,
    discount_percentage: u32,
    description: Option<String>,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

fn row_to_offer(row: OfferRow, id: Uuid) -> Result<Offer, DbError> {
    Ok(Offer {
        id,
        yacht_id: parse_uuid(&row.yacht_id, "yacht")?,
        discount_percentage: row.discount_percentage,
        description: row.description,
        valid_from: row.valid_from,
        valid_until: row.valid_until,
        is_active: row.is_active,
        created_at: row.created_at,
    })
}

impl OfferRowWithId {
    fn try_into_offer(self) -> Result<Offer, DbError> {
        let id = parse_uuid(&self.record_id, "offer")?;
        row_to_offer(
            OfferRow {
                yacht_id: self.yacht_id,
                discount_percentage: self.discount_percentage,
                description: self.description,
                valid_from: self.valid_from,
                valid_until: self.valid_until,
                is_active: self.is_active,
                created_at: self.created_at,
            },
            id,
        )
    }
}

#[derive(Clone)]
pub struct SurrealOfferRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOfferRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OfferRepository for SurrealOfferRepository<C> {
    async fn create(&self, input: CreateOffer) -> CharterResult<Offer> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('offer', $id) SET \
                 yacht_id = $yacht_id, \
                 discount_percentage = $discount_percentage, \
                 description = $description, \
                 valid_from = $valid_from, valid_until = $valid_until, \
                 is_active = $is_active",
            )
            .bind(("id", id_str.clone()))
            .bind(("yacht_id", input.yacht_id.to_string()))
            .bind(("discount_percentage", input.discount_percentage))
            .bind(("description", input.description))
            .bind(("valid_from", input.valid_from))
            .bind(("valid_until", input.valid_until))
            .bind(("is_active", input.is_active))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("offer", e))?;

        let rows: Vec<OfferRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "offer".into(),
            id: id_str,
        })?;

        row_to_offer(row, id).map_err(Into::into)
    }

    async fn list_active(&self, yacht_id: Uuid, now: DateTime<Utc>) -> CharterResult<Vec<Offer>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM offer \
                 WHERE yacht_id = $yacht_id AND is_active = true \
                 AND valid_from <= $now AND valid_until >= $now \
                 ORDER BY discount_percentage DESC",
            )
            .bind(("yacht_id", yacht_id.to_string()))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OfferRowWithId> = result.take(0).map_err(DbError::from)?;
        let offers = rows
            .into_iter()
            .map(|row| row.try_into_offer())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(offers)
    }
}
