// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token store implementations.
//!
//! [`FileTokenStore`] persists the session as one JSON document under the
//! OS data directory, written atomically (temp file + rename) so a crash
//! mid-write never leaves a torn session behind. [`MemoryTokenStore`] backs
//! tests and ephemeral sessions.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use shiftswap_core::{ErrorCode, ExchangeError, SessionTokenStore, StoredSession};

fn storage_error(context: &str, err: impl std::fmt::Display) -> ExchangeError {
    ExchangeError::new(ErrorCode::SessionStorage, format!("{context}: {err}"))
}

/// File-backed session token store.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default session document location:
    /// `<data_dir>/shiftswap/session.json`.
    pub fn default_path() -> Result<PathBuf, ExchangeError> {
        let base = dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut home| {
                    home.push(".local");
                    home.push("share");
                    home
                })
            })
            .ok_or_else(|| {
                ExchangeError::new(
                    ErrorCode::SessionStorage,
                    "failed to resolve the OS data directory",
                )
            })?;
        Ok(base.join("shiftswap").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionTokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<StoredSession>, ExchangeError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(storage_error("failed to read session document", err)),
        };
        let session = serde_json::from_slice(&bytes)
            .map_err(|err| storage_error("corrupt session document", err))?;
        Ok(Some(session))
    }

    async fn save(&self, session: &StoredSession) -> Result<(), ExchangeError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| storage_error("failed to create session directory", err))?;
        }

        let bytes = serde_json::to_vec_pretty(session)
            .map_err(|err| storage_error("failed to encode session document", err))?;

        // Atomic replace: write a sibling temp file, then rename over the
        // destination.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|err| storage_error("failed to write session document", err))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|err| storage_error("failed to replace session document", err))?;

        debug!(path = %self.path.display(), "session token persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<(), ExchangeError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "session token cleared");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error("failed to remove session document", err)),
        }
    }
}

/// In-memory token store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionTokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<StoredSession>, ExchangeError> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &StoredSession) -> Result<(), ExchangeError> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ExchangeError> {
        *self.session.lock().await = None;
        Ok(())
    }
}
