//! Persisted session state.
//!
//! Reads and writes `session.json` under the configured directory with
//! restrictive file permissions (0o600). A missing or corrupt file is
//! treated as "not logged in", never as an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::domain::auth::{AuthResponse, User};

const SESSION_FILE_NAME: &str = "session.json";

/// Everything the client persists between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Option<User>,
}

impl Session {
    pub fn from_auth(auth: &AuthResponse) -> Self {
        Self {
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone(),
            user: Some(auth.user.clone()),
        }
    }
}

/// File-backed session storage with an in-memory copy.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    /// Open the store under `dir`, loading any existing session file.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(SESSION_FILE_NAME);
        let current = load_session(&path);
        Self {
            path,
            current: Arc::new(RwLock::new(current)),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .map(|s| s.refresh_token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current.read().as_ref().and_then(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    /// Replace the session in memory and on disk.
    pub fn store(&self, session: Session) -> Result<()> {
        save_session(&self.path, &session)?;
        *self.current.write() = Some(session);
        Ok(())
    }

    /// Discard the session in memory and on disk.
    pub fn clear(&self) {
        *self.current.write() = None;
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, "failed to remove session file");
            }
        }
    }
}

fn load_session(path: &Path) -> Option<Session> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read session file");
            return None;
        }
    };

    match serde_json::from_str(&data) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse session file");
            None
        }
    }
}

fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create session directory")?;
    }

    let json = serde_json::to_string_pretty(session).context("failed to serialize session")?;
    std::fs::write(path, &json).context("failed to write session file")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        let _ = std::fs::set_permissions(path, perms);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        Session {
            access_token: "access-1".into(),
            refresh_token: "refresh-1".into(),
            user: Some(User {
                id: 7,
                email: "a@b.c".into(),
                username: "ab".into(),
                full_name: None,
                role: "user".into(),
                is_active: true,
            }),
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        assert!(!store.is_authenticated());

        store.store(sample_session()).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("access-1"));

        // A fresh store sees the persisted session
        let reopened = SessionStore::open(dir.path());
        assert_eq!(reopened.refresh_token().as_deref(), Some("refresh-1"));
        assert_eq!(reopened.user().unwrap().id, 7);
    }

    #[test]
    fn clear_removes_file_and_memory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.store(sample_session()).unwrap();

        store.clear();
        assert!(!store.is_authenticated());
        assert!(!SessionStore::open(dir.path()).is_authenticated());
    }

    #[test]
    fn corrupt_file_is_treated_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE_NAME), "not json").unwrap();
        assert!(!SessionStore::open(dir.path()).is_authenticated());
    }
}
