//! SurrealDB implementation of [`YachtRepository`].

use charter_core::error::CharterResult;
use charter_core::models::yacht::{CreateYacht, Yacht};
use charter_core::repository::YachtRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct YachtRow {
    name: String,
    hourly_price: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl YachtRow {
    fn into_yacht(self, id: Uuid) -> Yacht {
        Yacht {
            id,
            name: self.name,
            hourly_price: self.hourly_price,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone)]
pub struct SurrealYachtRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealYachtRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> YachtRepository for SurrealYachtRepository<C> {
    async fn create(&self, input: CreateYacht) -> CharterResult<Yacht> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('yacht', $id) SET \
                 name = $name, hourly_price = $hourly_price, is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("hourly_price", input.hourly_price))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("yacht", e))?;

        let rows: Vec<YachtRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "yacht".into(),
            id: id_str,
        })?;

        Ok(row.into_yacht(id))
    }

    async fn get_by_id(&self, id: Uuid) -> CharterResult<Yacht> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('yacht', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<YachtRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "yacht".into(),
            id: id_str,
        })?;

        Ok(row.into_yacht(id))
    }
}
