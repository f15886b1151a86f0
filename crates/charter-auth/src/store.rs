//! Persisted client session and last-activity timestamp.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use charter_core::error::CharterError;
use charter_core::models::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file error: {0}")]
    Io(#[from] io::Error),

    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("session store lock poisoned: {0}")]
    Poisoned(String),
}

impl From<StoreError> for CharterError {
    fn from(err: StoreError) -> Self {
        CharterError::Storage(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub session: Session,
    pub last_activity: DateTime<Utc>,
}

pub trait SessionStore: Send + Sync {
    fn save(&self, session: &Session, at: DateTime<Utc>) -> Result<(), StoreError>;
    fn load(&self) -> Result<Option<StoredSession>, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
    /// Record activity. A no-op when nothing is stored.
    fn touch(&self, at: DateTime<Utc>) -> Result<(), StoreError>;

    fn last_activity(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.load()?.map(|stored| stored.last_activity))
    }
}

/// One JSON document on disk, rewritten whole on every change.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, stored: &StoredSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(stored)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.write(&StoredSession {
            session: session.clone(),
            last_activity: at,
        })
    }

    fn load(&self) -> Result<Option<StoredSession>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn touch(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        match self.load()? {
            Some(mut stored) => {
                stored.last_activity = at;
                self.write(&stored)
            }
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut Option<StoredSession>) -> T,
    ) -> Result<T, StoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(f(&mut *state))
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.with_state(|state| {
            *state = Some(StoredSession {
                session: session.clone(),
                last_activity: at,
            });
        })
    }

    fn load(&self) -> Result<Option<StoredSession>, StoreError> {
        self.with_state(|state| state.clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.with_state(|state| *state = None)
    }

    fn touch(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.with_state(|state| {
            if let Some(stored) = state.as_mut() {
                stored.last_activity = at;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_core::models::role::Role;
    use chrono::Duration;
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            role: Role::User,
            is_verified: true,
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
        }
    }

    fn exercise(store: &dyn SessionStore) {
        assert!(store.load().unwrap().is_none());
        assert!(store.last_activity().unwrap().is_none());

        let now = Utc::now();
        store.touch(now).unwrap();
        assert!(store.load().unwrap().is_none());

        let session = session();
        store.save(&session, now).unwrap();
        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.session, session);
        assert_eq!(stored.last_activity, now);

        let later = now + Duration::minutes(3);
        store.touch(later).unwrap();
        assert_eq!(store.last_activity().unwrap(), Some(later));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn memory_store_lifecycle() {
        exercise(&MemorySessionStore::default());
    }

    #[test]
    fn file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileSessionStore::new(dir.path().join("session.json")));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let session = session();
        let at = Utc::now();
        FileSessionStore::new(&path).save(&session, at).unwrap();

        let reopened = FileSessionStore::new(&path);
        let stored = reopened.load().unwrap().unwrap();
        assert_eq!(stored.session, session);
        assert_eq!(stored.last_activity, at);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            FileSessionStore::new(&path).load(),
            Err(StoreError::Corrupt(_))
        ));
    }
}
