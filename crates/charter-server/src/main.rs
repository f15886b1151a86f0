//! Charter Server: application entry point.

mod settings;

use std::process::ExitCode;

use charter_auth::{FileSessionStore, Restored, SessionManager, SessionStore, StoreError};
use charter_booking::BookingError;
use charter_db::{DbError, DbManager};
use chrono::Utc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("database connection: {0}")]
    Connect(#[from] surrealdb::Error),

    #[error("database: {0}")]
    Db(#[from] DbError),

    #[error("booking settings: {0}")]
    Booking(#[from] BookingError),

    #[error("session store: {0}")]
    Store(#[from] StoreError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("charter=info,info")),
        )
        .json()
        .init();

    info!("Starting charter server...");

    match run().await {
        Ok(()) => {
            info!("Charter server stopped.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Charter server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let settings = Settings::load()?;
    settings.booking.validate()?;

    let db = DbManager::connect(&settings.db).await?;
    charter_db::run_migrations(db.client()).await?;
    info!(
        currency = %settings.booking.currency,
        default_duration_hours = settings.booking.default_duration_hours,
        otp_lifetime_secs = settings.auth.otp_lifetime_secs,
        mail_provider = ?settings.mail.provider,
        "Settings loaded"
    );

    let (mut sessions, mut idle_events) =
        SessionManager::new(FileSessionStore::new(&settings.session_file), &settings.auth);
    match sessions.restore(Utc::now())? {
        Restored::Active { session, status } => {
            info!(user_id = %session.user_id, ?status, "Session restored");
        }
        Restored::Expired => warn!("Stored session expired while away"),
        Restored::Nothing => info!("No stored session"),
    }

    // Each line on stdin counts as user activity.
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            line = input.next_line(), if input_open => {
                input_open = on_input(&mut sessions, line)?;
            }
            Some(event) = idle_events.recv() => {
                if sessions.handle(event)? {
                    warn!("Session expired after inactivity; sign in again");
                }
            }
        }
    }

    Ok(())
}

/// Record one line of input as activity. Returns whether to keep reading.
fn on_input<S: SessionStore>(
    sessions: &mut SessionManager<S>,
    line: std::io::Result<Option<String>>,
) -> Result<bool, StoreError> {
    match line {
        Ok(Some(_)) => {
            if !sessions.record_activity(Utc::now())? {
                debug!("Activity without an active session");
            }
            Ok(true)
        }
        Ok(None) => {
            debug!("Activity input closed");
            Ok(false)
        }
        Err(e) => {
            warn!(error = %e, "Activity input failed");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_auth::{AuthConfig, IdleStatus, MemorySessionStore};
    use charter_core::models::role::Role;
    use charter_core::models::session::Session;
    use chrono::Duration;
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            role: Role::User,
            is_verified: true,
            first_name: None,
            last_name: None,
        }
    }

    #[tokio::test]
    async fn input_lines_keep_the_session_alive() {
        let (mut sessions, _events) =
            SessionManager::new(MemorySessionStore::default(), &AuthConfig::default());
        sessions
            .establish(&session(), Utc::now() - Duration::minutes(19))
            .unwrap();

        assert!(on_input(&mut sessions, Ok(Some("key".into()))).unwrap());
        assert!(matches!(
            sessions.status(Utc::now()).unwrap(),
            Some(IdleStatus::Active { .. })
        ));
    }

    #[tokio::test]
    async fn closed_input_stops_reading() {
        let (mut sessions, _events) =
            SessionManager::new(MemorySessionStore::default(), &AuthConfig::default());
        assert!(!on_input(&mut sessions, Ok(None)).unwrap());
        assert!(!on_input(&mut sessions, Err(std::io::ErrorKind::BrokenPipe.into())).unwrap());
    }
}
