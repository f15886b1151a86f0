//! SurrealDB implementation of [`OtpRepository`].

use charter_core::error::CharterResult;
use charter_core::models::otp::{CreateOtpChallenge, OtpChallenge, OtpKind};
use charter_core::repository::OtpRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

use super::user::normalize_email;
use super::{parse_optional_uuid, parse_uuid};

#[derive(Debug, SurrealValue)]
struct OtpRow {
    user_id: Option<String>,
    email: String,
    code: String,
    kind: String,
    expires_at: DateTime<Utc>,
    used: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct OtpRowWithId {
    record_id: String,
    user_id: Option<String>,
    email: String,
    code: String,
    kind: String,
    expires_at: DateTime<Utc>,
    used: bool,
    created_at: DateTime<Utc>,
}

fn row_to_challenge(row: OtpRow, id: Uuid) -> Result<OtpChallenge, DbError> {
    let kind = OtpKind::parse(&row.kind)
        .ok_or_else(|| DbError::Decode(format!("unknown otp kind: {}", row.kind)))?;
    Ok(OtpChallenge {
        id,
        user_id: parse_optional_uuid(row.user_id.as_deref(), "user")?,
        email: row.email,
        code: row.code,
        kind,
        expires_at: row.expires_at,
        used: row.used,
        created_at: row.created_at,
    })
}

impl OtpRowWithId {
    fn try_into_challenge(self) -> Result<OtpChallenge, DbError> {
        let id = parse_uuid(&self.record_id, "otp")?;
        row_to_challenge(
            OtpRow {
                user_id: self.user_id,
                email: self.email,
                code: self.code,
                kind: self.kind,
                expires_at: self.expires_at,
                used: self.used,
                created_at: self.created_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the one-time code repository.
#[derive(Clone)]
pub struct SurrealOtpRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOtpRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OtpRepository for SurrealOtpRepository<C> {
    async fn create(&self, input: CreateOtpChallenge) -> CharterResult<OtpChallenge> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('otp_challenge', $id) SET \
                 user_id = $user_id, email = $email, code = $code, \
                 kind = $kind, expires_at = $expires_at, used = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.map(|u| u.to_string())))
            .bind(("email", normalize_email(&input.email)))
            .bind(("code", input.code))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("otp_challenge", e))?;

        let rows: Vec<OtpRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "otp_challenge".into(),
            id: id_str,
        })?;

        row_to_challenge(row, id).map_err(Into::into)
    }

    async fn find_latest_valid(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> CharterResult<Option<OtpChallenge>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM otp_challenge \
                 WHERE email = $email AND code = $code \
                 AND used = false AND expires_at > $now \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(("email", normalize_email(email)))
            .bind(("code", code.to_string()))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OtpRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_challenge()?)),
            None => Ok(None),
        }
    }

    async fn mark_used(&self, id: Uuid) -> CharterResult<bool> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('otp_challenge', $id) \
                 SET used = true WHERE used = false",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("otp_challenge", e))?;

        let rows: Vec<OtpRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }
}
