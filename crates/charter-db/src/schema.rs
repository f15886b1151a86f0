//! SurrealDB schema and its migration runner.
//!
//! Tables are SCHEMAFULL. UUIDs and calendar dates are strings; status
//! and kind enums are strings constrained with ASSERT.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Accounts
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['admin', 'user'];
DEFINE FIELD first_name ON TABLE user TYPE option<string>;
DEFINE FIELD last_name ON TABLE user TYPE option<string>;
DEFINE FIELD phone ON TABLE user TYPE option<string>;
DEFINE FIELD password_hash ON TABLE user TYPE option<string>;
DEFINE FIELD is_verified ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- One-time codes
-- =======================================================================
DEFINE TABLE otp_challenge SCHEMAFULL;
DEFINE FIELD user_id ON TABLE otp_challenge TYPE option<string>;
DEFINE FIELD email ON TABLE otp_challenge TYPE string;
DEFINE FIELD code ON TABLE otp_challenge TYPE string;
DEFINE FIELD kind ON TABLE otp_challenge TYPE string \
    ASSERT $value IN ['login', 'password_reset', 'first_login'];
DEFINE FIELD expires_at ON TABLE otp_challenge TYPE datetime;
DEFINE FIELD used ON TABLE otp_challenge TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE otp_challenge TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_otp_email_code ON TABLE otp_challenge \
    COLUMNS email, code;

-- =======================================================================
-- Fleet
-- =======================================================================
DEFINE TABLE yacht SCHEMAFULL;
DEFINE FIELD name ON TABLE yacht TYPE string;
DEFINE FIELD hourly_price ON TABLE yacht TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD is_active ON TABLE yacht TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE yacht TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE offer SCHEMAFULL;
DEFINE FIELD yacht_id ON TABLE offer TYPE string;
DEFINE FIELD discount_percentage ON TABLE offer TYPE int \
    ASSERT $value >= 0 AND $value <= 100;
DEFINE FIELD description ON TABLE offer TYPE option<string>;
DEFINE FIELD valid_from ON TABLE offer TYPE datetime;
DEFINE FIELD valid_until ON TABLE offer TYPE datetime;
DEFINE FIELD is_active ON TABLE offer TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE offer TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_offer_yacht ON TABLE offer COLUMNS yacht_id;

-- =======================================================================
-- Reservations
-- =======================================================================
DEFINE TABLE reservation SCHEMAFULL;
DEFINE FIELD yacht_id ON TABLE reservation TYPE string;
DEFINE FIELD user_id ON TABLE reservation TYPE option<string>;
DEFINE FIELD booking_date ON TABLE reservation TYPE string;
DEFINE FIELD start_hour ON TABLE reservation TYPE int \
    ASSERT $value >= 0 AND $value <= 23;
DEFINE FIELD duration_hours ON TABLE reservation TYPE option<int> \
    ASSERT $value = NONE OR $value > 0;
DEFINE FIELD end_hour ON TABLE reservation TYPE int;
DEFINE FIELD total_price ON TABLE reservation TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD offer_id ON TABLE reservation TYPE option<string>;
DEFINE FIELD guest_name ON TABLE reservation TYPE string;
DEFINE FIELD guest_email ON TABLE reservation TYPE string;
DEFINE FIELD guest_phone ON TABLE reservation TYPE option<string>;
DEFINE FIELD status ON TABLE reservation TYPE string \
    ASSERT $value IN ['pending', 'confirmed', 'cancelled', 'completed'];
DEFINE FIELD created_at ON TABLE reservation TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE reservation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_reservation_yacht_day ON TABLE reservation \
    COLUMNS yacht_id, booking_date;
DEFINE INDEX idx_reservation_user ON TABLE reservation \
    COLUMNS user_id;
";

/// Highest applied migration version; 0 on a fresh database.
pub async fn schema_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map_or(0, |m| m.version))
}

/// Apply every migration newer than [`schema_version`], recording each
/// one in `_migration` as it lands.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    let current = schema_version(db).await?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > current);

    for migration in pending {
        info!(version = migration.version, name = migration.name, "Applying migration");
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!("v{} '{}': {e}", migration.version, migration.name))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!("recording v{}: {e}", migration.version))
            })?;
    }

    debug!(version = latest_version(), "Schema up to date");
    Ok(())
}

fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Raw DDL of the first migration.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
