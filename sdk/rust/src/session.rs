//! Session persistence
//!
//! A store holds at most one session. Writers are assumed to be single;
//! with several writers (e.g. two processes sharing one session file) the
//! last write wins.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default location of the session file, relative to the working directory
const DEFAULT_SESSION_PATH: &str = "./.session/session.json";

/// Token triple plus absolute expiry
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub id_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Expired once `now` reaches `expires_at`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_expired(self, now)
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

pub fn is_expired(session: &Session, now: DateTime<Utc>) -> bool {
    now >= session.expires_at
}

/// Single-slot session storage
pub trait SessionStore: Send + Sync {
    /// Replace the stored session
    fn save(&self, session: &Session) -> Result<()>;

    fn load(&self) -> Result<Option<Session>>;

    /// Remove the stored session; clearing an empty store is not an error
    fn clear(&self) -> Result<()>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot.lock().clone())
    }

    fn clear(&self) -> Result<()> {
        self.slot.lock().take();
        Ok(())
    }
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_PATH)
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: DateTime<Utc>) -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            id_token: "id".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_is_expired_boundary() {
        let now = Utc::now();
        assert!(session(now).is_expired(now));
        assert!(session(now - Duration::seconds(10)).is_expired(now));
        assert!(!session(now + Duration::seconds(1)).is_expired(now));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let rendered = format!("{:?}", session(Utc::now()));
        assert!(!rendered.contains("access"));
        assert!(!rendered.contains("refresh"));
    }

    #[test]
    fn test_memory_store_roundtrip_and_clear() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());

        let s = session(Utc::now());
        store.save(&s).unwrap();
        assert_eq!(store.load().unwrap(), Some(s));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_last_write_wins() {
        let store = MemorySessionStore::new();
        let first = session(Utc::now());
        let mut second = session(Utc::now());
        second.access_token = "newer".to_string();

        store.save(&first).unwrap();
        store.save(&second).unwrap();
        assert_eq!(store.load().unwrap().unwrap().access_token, "newer");
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested/session.json"));
        let s = session(Utc::now());

        store.save(&s).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), Some(s));
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&session(Utc::now())).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileSessionStore::new(path);
        assert!(matches!(
            store.load(),
            Err(crate::Error::Serialization(_))
        ));
    }
}
