//! Layered process configuration.
//!
//! Sources, later ones winning: `config/default`, `config/{RUN_MODE}`
//! (optional), `config/local` (optional), then `CHARTER__*` environment
//! variables with `__` between path segments, e.g.
//! `CHARTER__DB__URL=db.internal:8000`.

use std::env;
use std::path::PathBuf;

use charter_auth::{AuthConfig, MailConfig};
use charter_booking::BookingConfig;
use charter_db::DbConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auth: AuthConfig,
    pub booking: BookingConfig,
    pub db: DbConfig,
    pub mail: MailConfig,
    /// Where the signed-in session and last activity are persisted.
    pub session_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            booking: BookingConfig::default(),
            db: DbConfig::default(),
            mail: MailConfig::default(),
            session_file: PathBuf::from("data/session.json"),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_from("config", &run_mode)
    }

    pub fn load_from(dir: &str, run_mode: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{run_mode}")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/local")).required(false))
            .add_source(config::Environment::with_prefix("CHARTER").separator("__"))
            .build()?
            .try_deserialize()
    }
}
