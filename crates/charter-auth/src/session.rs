//! Client session lifecycle: sign-in, reload, activity, logout and idle
//! expiry.

use charter_core::models::session::Session;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::AuthConfig;
use crate::idle::{IdlePolicy, IdleStatus};
use crate::store::{SessionStore, StoreError};
use crate::watchdog::{IdleEvent, IdleWatchdog, WatchdogTimings};

/// Outcome of [`SessionManager::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restored {
    Nothing,
    Active { session: Session, status: IdleStatus },
    /// The stored session had been idle too long and was cleared.
    Expired,
}

/// Owns the persisted session and the idle watchdog. Must be used from
/// within a tokio runtime.
pub struct SessionManager<S: SessionStore> {
    store: S,
    policy: IdlePolicy,
    watchdog: IdleWatchdog,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, config: &AuthConfig) -> (Self, mpsc::UnboundedReceiver<IdleEvent>) {
        let policy = IdlePolicy::from_config(config);
        let (watchdog, events) = IdleWatchdog::new(WatchdogTimings::from_policy(&policy));
        (
            Self {
                store,
                policy,
                watchdog,
            },
            events,
        )
    }

    pub fn policy(&self) -> &IdlePolicy {
        &self.policy
    }

    pub fn current(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.store.load()?.map(|stored| stored.session))
    }

    /// Persist a fresh sign-in and arm the full idle budget.
    pub fn establish(&mut self, session: &Session, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.store.save(session, now)?;
        self.watchdog.reset();
        info!(user_id = %session.user_id, role = session.role.as_str(), "Session established");
        Ok(())
    }

    /// Reload: rebuild the idle budget from the stored last activity.
    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<Restored, StoreError> {
        let Some(stored) = self.store.load()? else {
            return Ok(Restored::Nothing);
        };

        let status = self.policy.status(stored.last_activity, now);
        if status == IdleStatus::Expired {
            self.expire()?;
            return Ok(Restored::Expired);
        }

        let idle = (now - stored.last_activity).to_std().unwrap_or_default();
        self.watchdog.start(idle);
        Ok(Restored::Active {
            session: stored.session,
            status,
        })
    }

    /// Pointer, key, scroll or touch input. Returns `false` when there
    /// is no session to keep alive; a session already past its idle
    /// budget is expired instead of refreshed.
    pub fn record_activity(&mut self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        match self.status(now)? {
            None => return Ok(false),
            Some(IdleStatus::Expired) => {
                self.expire()?;
                return Ok(false);
            }
            Some(_) => {}
        }
        self.store.touch(now)?;
        self.watchdog.reset();
        Ok(true)
    }

    pub fn status(&self, now: DateTime<Utc>) -> Result<Option<IdleStatus>, StoreError> {
        Ok(self
            .store
            .last_activity()?
            .map(|last| self.policy.status(last, now)))
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.watchdog.stop();
        self.store.clear()?;
        info!("Signed out");
        Ok(())
    }

    /// End the session for inactivity.
    pub fn expire(&mut self) -> Result<(), StoreError> {
        self.watchdog.stop();
        self.store.clear()?;
        info!("Session expired after inactivity");
        Ok(())
    }

    /// Feed a watchdog event back in. Returns `true` once the session
    /// has been ended.
    pub fn handle(&mut self, event: IdleEvent) -> Result<bool, StoreError> {
        match event {
            IdleEvent::Expired => {
                self.expire()?;
                Ok(true)
            }
            IdleEvent::Tick { .. } | IdleEvent::Warning { .. } => Ok(false),
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watchdog.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;
    use charter_core::models::role::Role;
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

    fn manager() -> (
        SessionManager<MemorySessionStore>,
        mpsc::UnboundedReceiver<IdleEvent>,
    ) {
        SessionManager::new(MemorySessionStore::default(), &AuthConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn restore_after_twenty_five_minutes_expires_at_once() {
        let (mut mgr, _events) = manager();
        let now = Utc::now();
        mgr.store.save(&session(), now - Duration::minutes(25)).unwrap();

        assert_eq!(mgr.restore(now).unwrap(), Restored::Expired);
        assert!(mgr.current().unwrap().is_none());
        assert!(!mgr.is_watching());
    }

    #[tokio::test(start_paused = true)]
    async fn restore_after_nineteen_minutes_is_in_warning() {
        let (mut mgr, mut events) = manager();
        let now = Utc::now();
        let session = session();
        mgr.store.save(&session, now - Duration::minutes(19)).unwrap();

        let restored = mgr.restore(now).unwrap();
        assert_eq!(
            restored,
            Restored::Active {
                session,
                status: IdleStatus::Warning {
                    remaining: Duration::minutes(1)
                }
            }
        );
        assert!(mgr.is_watching());

        let ended = loop {
            let event = events.recv().await.unwrap();
            if mgr.handle(event).unwrap() {
                break event;
            }
        };
        assert_eq!(ended, IdleEvent::Expired);
        assert!(mgr.current().unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn restore_without_session_is_nothing() {
        let (mut mgr, _events) = manager();
        assert_eq!(mgr.restore(Utc::now()).unwrap(), Restored::Nothing);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_refreshes_the_stored_timestamp() {
        let (mut mgr, _events) = manager();
        let start = Utc::now();
        mgr.establish(&session(), start).unwrap();

        let later = start + Duration::minutes(19);
        assert!(matches!(
            mgr.status(later).unwrap(),
            Some(IdleStatus::Warning { .. })
        ));
        assert!(mgr.record_activity(later).unwrap());
        assert_eq!(
            mgr.status(later).unwrap(),
            Some(IdleStatus::Active {
                remaining: Duration::minutes(20)
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn late_activity_does_not_revive_an_idle_session() {
        let (mut mgr, _events) = manager();
        let start = Utc::now();
        mgr.establish(&session(), start).unwrap();

        let late = start + Duration::minutes(20) + Duration::seconds(1);
        assert!(!mgr.record_activity(late).unwrap());
        assert!(mgr.current().unwrap().is_none());
        assert!(!mgr.is_watching());
    }

    #[tokio::test(start_paused = true)]
    async fn activity_without_session_is_ignored() {
        let (mut mgr, _events) = manager();
        assert!(!mgr.record_activity(Utc::now()).unwrap());
        assert!(!mgr.is_watching());
    }

    #[tokio::test(start_paused = true)]
    async fn logout_clears_store_and_timers() {
        let (mut mgr, _events) = manager();
        mgr.establish(&session(), Utc::now()).unwrap();
        assert!(mgr.is_watching());

        mgr.logout().unwrap();
        assert!(!mgr.is_watching());
        assert!(mgr.current().unwrap().is_none());
        assert_eq!(mgr.status(Utc::now()).unwrap(), None);
    }
}
