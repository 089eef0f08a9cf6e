//! Persisted access credentials.
//!
//! A [`SessionStore`] keeps one session per provider under two keys:
//! `<prefix>_session` (the JSON session) and `<prefix>_token` (the bare
//! access token). Storage is synchronous and last-write-wins.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// An opaque provider session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token. Never stored empty.
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Whatever else the provider returned at sign-in.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Session {
    /// A session carrying only an access token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            extras: Map::new(),
        }
    }

    /// The access token, if present and non-empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    fn normalized(mut self) -> Self {
        if self.token().is_none() {
            self.access_token = None;
        }
        self
    }
}

/// Key/value storage behind a [`SessionStore`].
pub trait SessionBackend: Send + Sync + fmt::Debug {
    /// Reads a value, `None` when absent or unreadable.
    fn read(&self, key: &str) -> Option<String>;

    /// Writes a value, replacing any previous one.
    fn write(&self, key: &str, value: &str) -> io::Result<()>;

    /// Removes a value. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Process-local storage; sessions are lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionBackend {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionBackend {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionBackend for MemorySessionBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileSessionBackend {
    dir: PathBuf,
}

impl FileSessionBackend {
    /// Stores values under `dir`, creating it on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionBackend for FileSessionBackend {
    fn read(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key)).ok()
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Single-slot session storage namespaced by provider.
#[derive(Debug, Clone)]
pub struct SessionStore {
    prefix: String,
    backend: Arc<dyn SessionBackend>,
}

impl SessionStore {
    /// Creates a store whose keys start with `prefix`.
    pub fn new(prefix: impl Into<String>, backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            prefix: prefix.into(),
            backend,
        }
    }

    /// In-memory store.
    pub fn in_memory(prefix: impl Into<String>) -> Self {
        Self::new(prefix, Arc::new(MemorySessionBackend::new()))
    }

    fn session_key(&self) -> String {
        format!("{}_session", self.prefix)
    }

    fn token_key(&self) -> String {
        format!("{}_token", self.prefix)
    }

    /// Current session. A missing or corrupt value reads as `None`.
    #[must_use]
    pub fn get_session(&self) -> Option<Session> {
        let raw = self.backend.read(&self.session_key())?;
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session.normalized()),
            Err(err) => {
                debug!(prefix = %self.prefix, error = %err, "ignoring unreadable stored session");
                None
            }
        }
    }

    /// The separately stored access token.
    #[must_use]
    pub fn stored_token(&self) -> Option<String> {
        self.backend
            .read(&self.token_key())
            .filter(|t| !t.is_empty())
    }

    /// Persists `session`, or clears every session key when `None`.
    ///
    /// Write failures are logged, not returned.
    pub fn store_session(&self, session: Option<Session>) {
        let Some(session) = session.map(Session::normalized) else {
            self.remove(&self.session_key());
            self.remove(&self.token_key());
            return;
        };

        match serde_json::to_string(&session) {
            Ok(raw) => self.write(&self.session_key(), &raw),
            Err(err) => warn!(prefix = %self.prefix, error = %err, "failed to encode session"),
        }
        match session.token() {
            Some(token) => self.write(&self.token_key(), token),
            None => self.remove(&self.token_key()),
        }
    }

    /// Same as `store_session(None)`.
    pub fn clear_session(&self) {
        self.store_session(None);
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(err) = self.backend.write(key, value) {
            warn!(key, error = %err, "failed to persist session value");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(err) = self.backend.remove(key) {
            warn!(key, error = %err, "failed to remove session value");
        }
    }
}
