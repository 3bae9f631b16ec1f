//! Single-slot session store for the operator's bearer credential.
//!
//! The store is an explicitly owned object shared through `Arc`. Every
//! outbound request reads it at send time, so clearing it takes effect on
//! the next request. Status changes are published on a `watch` channel.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockWriteGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};


/// Opaque bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value, for the Authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

/// Session lifecycle as observed by subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No login has happened yet
    Anonymous,
    Authenticated,
    /// Operator logged out
    SignedOut,
    /// Backend rejected the credential; re-authentication required
    Expired,
}

/// Session store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// File used to keep the token across process restarts.
    /// None keeps the session in memory only.
    #[serde(default)]
    pub persist_path: Option<PathBuf>,
}

pub struct SessionStore {
    credential: RwLock<Option<Credential>>,
    persist_path: Option<PathBuf>,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionStore {
    /// In-memory store with no credential
    pub fn new() -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Anonymous);
        Self {
            credential: RwLock::new(None),
            persist_path: None,
            status_tx,
        }
    }

    /// Open a store, restoring a persisted credential if the config names one
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let mut store = Self::new();
        let Some(path) = config.persist_path.clone() else {
            return Ok(store);
        };

        match fs::read_to_string(&path) {
            Ok(contents) => {
                let token = contents.trim();
                if !token.is_empty() {
                    *store.credential.get_mut().unwrap_or_else(|e| e.into_inner()) =
                        Some(Credential::new(token));
                    store.status_tx.send_replace(SessionStatus::Authenticated);
                    info!(path = %path.display(), "Restored persisted session");
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No persisted session");
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read session file {}", path.display()));
            }
        }

        store.persist_path = Some(path);
        Ok(store)
    }

    /// Install a new credential, replacing any previous one
    pub fn set(&self, credential: Credential) {
        let mut slot = self.write_slot();
        if let Some(path) = &self.persist_path {
            if let Err(e) = write_token(path, credential.expose()) {
                warn!(error = %e, "Failed to persist session credential");
            }
        }
        *slot = Some(credential);
        self.status_tx.send_replace(SessionStatus::Authenticated);
        info!("Session credential set");
    }

    /// Current credential, read fresh on every call
    pub fn get(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Explicit logout. Returns true if a credential was removed.
    pub fn clear(&self) -> bool {
        let mut slot = self.write_slot();
        let removed = self.take(&mut slot);
        self.status_tx.send_replace(SessionStatus::SignedOut);
        removed
    }

    /// Drop the credential after the backend rejected it.
    ///
    /// Returns true only on the transition into `Expired`; calling it again
    /// before the next `set` is a no-op.
    pub fn expire(&self) -> bool {
        // Status changes under the same lock as the slot so a concurrent
        // `set` cannot land between the two
        let mut slot = self.write_slot();
        self.take(&mut slot);
        self.status_tx.send_if_modified(|status| {
            if *status == SessionStatus::Expired {
                false
            } else {
                *status = SessionStatus::Expired;
                true
            }
        })
    }

    pub fn status(&self) -> SessionStatus {
        *self.status_tx.borrow()
    }

    /// Subscribe to session status changes
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<Credential>> {
        self.credential.write().unwrap_or_else(|e| e.into_inner())
    }

    fn take(&self, slot: &mut Option<Credential>) -> bool {
        let removed = slot.take().is_some();
        if let Some(path) = &self.persist_path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(error = %e, "Failed to remove persisted session"),
            }
        }
        if removed {
            info!("Session credential cleared");
        }
        removed
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the token via a temporary file and rename
fn write_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, token).context("Failed to write temporary session file")?;
    fs::rename(&tmp_path, path).context("Failed to rename session file")?;
    Ok(())
}
