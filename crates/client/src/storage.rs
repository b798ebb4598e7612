//! Durable client-side storage.
//!
//! A small string key/value store that survives restarts. Two slots are used:
//! [`TOKEN`] for the credential and [`THEME`] for the colour scheme. The web
//! frontend backs this with the browser's session cookie; the CLI with a JSON
//! file in its state directory.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

/// Slot holding the bearer credential.
pub const TOKEN: &str = "token";

/// Slot holding the theme preference.
pub const THEME: &str = "theme";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is corrupt: {0}")]
    Format(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// String key/value persistence.
pub trait Storage: Send + Sync {
    /// Read a slot. Absent slots are `Ok(None)`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write a slot, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Erase a slot. Erasing an absent slot succeeds.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// In-memory storage. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.lock().await.remove(key);
        Ok(())
    }
}

/// File-backed storage: one JSON object per state directory.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// original, so a crash never leaves a half-written state file. Reads of a
/// corrupt file fail with [`StorageError::Format`]; writes replace it.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileStorage {
    /// File name used inside the state directory.
    pub const FILE_NAME: &'static str = "state.json";

    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(Self::FILE_NAME),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Slots to write on top of. A corrupt file counts as empty and is
    /// flagged so the next write replaces it.
    async fn load_for_write(&self) -> Result<(HashMap<String, String>, bool), StorageError> {
        match self.load().await {
            Ok(slots) => Ok((slots, false)),
            Err(StorageError::Format(e)) => {
                warn!(path = %self.path.display(), error = %e, "Resetting corrupt state file");
                Ok((HashMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn store(&self, slots: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(slots)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let (mut slots, _) = self.load_for_write().await?;
        slots.insert(key.to_owned(), value.to_owned());
        self.store(&slots).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let (mut slots, corrupt) = self.load_for_write().await?;
        if slots.remove(key).is_some() || corrupt {
            self.store(&slots).await?;
        }
        Ok(())
    }
}
