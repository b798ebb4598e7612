//! Client storage backed by the browser's session cookie.
//!
//! Each slot is a key in the tower-sessions record, so the credential and
//! theme live exactly as long as the browser session does.

use libris_client::{Storage, StorageError};
use tower_sessions::Session;

/// [`Storage`] over a tower-sessions [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStorage(Session);

impl SessionStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }
}

fn backend(e: &tower_sessions::session::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

impl Storage for SessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.get::<String>(key).await.map_err(|e| backend(&e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0.insert(key, value).await.map_err(|e| backend(&e))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.0
            .remove::<String>(key)
            .await
            .map(drop)
            .map_err(|e| backend(&e))
    }
}
