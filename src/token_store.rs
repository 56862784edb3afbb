//! Local bearer token cache
//!
//! One key (`youtube_token`) holding the OAuth access token. Nothing else is
//! persisted.

use crate::error::Result;
use crate::types::BearerToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Persistent storage for the bearer token
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any
    fn load(&self) -> Result<Option<BearerToken>>;

    /// Store a token, replacing any previous one
    fn save(&self, token: &BearerToken) -> Result<()>;

    /// Remove the stored token; succeeds when nothing is stored
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    youtube_token: BearerToken,
    saved_at: DateTime<Utc>,
}

/// Token store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`; parent directories are created on save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<BearerToken>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<TokenFile>(&raw) {
            Ok(file) => Ok(Some(file.youtube_token)),
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "ignoring unreadable token file");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &BearerToken) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = TokenFile {
            youtube_token: token.clone(),
            saved_at: Utc::now(),
        };
        std::fs::write(&self.path, serde_json::to_vec_pretty(&file)?)?;
        tracing::debug!(path = ?self.path, "token saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory token store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<BearerToken>>,
}

impl MemoryTokenStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a token
    pub fn with_token(token: BearerToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<BearerToken>> {
        let guard = self.token.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, token: &BearerToken) -> Result<()> {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}
