//! Database-specific error types and conversions.

use charter_core::error::CharterError;

/// Message thrown by the reservation insert when the window is taken.
pub(crate) const SLOT_CONFLICT: &str = "slot_conflict";

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Reservation overlaps an existing booking")]
    SlotConflict,

    #[error("Stored record is malformed: {0}")]
    Decode(String),
}

impl DbError {
    /// Classify a failed statement by the message SurrealDB reports.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains(SLOT_CONFLICT) {
            DbError::SlotConflict
        } else if message.contains("already contains") {
            DbError::AlreadyExists {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for CharterError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CharterError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => CharterError::AlreadyExists { entity },
            DbError::SlotConflict => CharterError::Conflict {
                message: "this time slot was just booked, please pick another".into(),
            },
            other => CharterError::Database(other.to_string()),
        }
    }
}
