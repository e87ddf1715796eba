//! Client-held session state: the bearer token plus the cached user record.
//! The store is an explicit, cloneable handle passed into the API layer;
//! there is no process-global session. Token and user are written together
//! and cleared together, so readers never see one without the other.

use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::model::User;
use crate::tprintln;

/// An authenticated identity: opaque token plus the user record the server
/// returned with it. No expiry, no refresh; the token stays valid locally
/// until the server rejects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh session. Both fields land under one write lock.
    pub fn set(&self, token: impl Into<String>, user: User) {
        let session = Session { token: token.into(), user };
        tprintln!("session.set user={} token_len={}", session.user.username, session.token.len());
        *self.inner.write() = Some(session);
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.inner.read().as_ref().map(|s| s.user.clone())
    }

    /// Canonical path key for the signed-in user's server resources: the
    /// server-assigned id. The username is a display attribute only.
    pub fn user_key(&self) -> Option<String> {
        self.inner.read().as_ref().map(|s| s.user.id.clone())
    }

    /// Swap the cached user record, keeping the token. Used when the
    /// server returns a post-mutation user (profile edit, favorites).
    /// No-op without an active session.
    pub fn replace_user(&self, user: User) {
        let mut guard = self.inner.write();
        if let Some(session) = guard.as_mut() {
            session.user = user;
        }
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.inner.read().clone()
    }

    pub fn clear(&self) {
        tprintln!("session.clear");
        *self.inner.write() = None;
    }

    /// Read a persisted session from disk. Returns whether one was found;
    /// a missing file leaves the store untouched.
    pub fn load(&self, path: &Path) -> io::Result<bool> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        let session: Session = serde_json::from_slice(&bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        tprintln!("session.load user={} from {}", session.user.username, path.display());
        *self.inner.write() = Some(session);
        Ok(true)
    }

    /// Persist the current session as JSON; with no active session the
    /// file is removed instead, so a logout sticks across restarts.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        match self.snapshot() {
            Some(session) => {
                let bytes = serde_json::to_vec_pretty(&session)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                std::fs::write(path, bytes)
            }
            None => match std::fs::remove_file(path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        serde_json::from_str(r#"{"_id":"1","Username":"a","FavoriteMovies":[]}"#).unwrap()
    }

    #[test]
    fn returns_exactly_what_was_stored() {
        let store = SessionStore::new();
        let user = sample_user();
        store.set("T", user.clone());
        assert_eq!(store.token().as_deref(), Some("T"));
        assert_eq!(store.user(), Some(user));
        assert_eq!(store.user_key().as_deref(), Some("1"));
    }

    #[test]
    fn clear_empties_everything() {
        let store = SessionStore::new();
        store.set("T", sample_user());
        store.clear();
        assert_eq!(store.token(), None);
        assert_eq!(store.user(), None);
        assert_eq!(store.user_key(), None);
    }

    #[test]
    fn replace_user_keeps_token() {
        let store = SessionStore::new();
        store.set("T", sample_user());
        let mut updated = sample_user();
        updated.favorite_movies.push("42".into());
        store.replace_user(updated.clone());
        assert_eq!(store.token().as_deref(), Some("T"));
        assert_eq!(store.user(), Some(updated));
    }

    #[test]
    fn replace_user_without_session_is_noop() {
        let store = SessionStore::new();
        store.replace_user(sample_user());
        assert_eq!(store.user(), None);
    }

    #[test]
    fn clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        store.set("T", sample_user());
        assert_eq!(other.token().as_deref(), Some("T"));
        other.clear();
        assert_eq!(store.token(), None);
    }

    #[test]
    fn persists_and_reloads() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("session.json");

        let store = SessionStore::new();
        store.set("T", sample_user());
        store.save(&path).unwrap();

        let reloaded = SessionStore::new();
        assert!(reloaded.load(&path).unwrap());
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn load_missing_file_leaves_store_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new();
        assert!(!store.load(&tmp.path().join("absent.json")).unwrap());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn save_after_clear_removes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("session.json");

        let store = SessionStore::new();
        store.set("T", sample_user());
        store.save(&path).unwrap();
        assert!(path.exists());

        store.clear();
        store.save(&path).unwrap();
        assert!(!path.exists());
        // Saving again with no session and no file is still fine
        store.save(&path).unwrap();
    }
}
