//! Light/dark theme preference, persisted in the [`THEME`] slot.

use core::fmt;

use tracing::warn;

use crate::storage::{Storage, StorageError, THEME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse a stored value; anything unrecognised is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Read the stored preference, falling back to light.
    pub async fn load(storage: &impl Storage) -> Self {
        match storage.get(THEME).await {
            Ok(value) => value.as_deref().and_then(Self::parse).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Could not read theme preference");
                Self::default()
            }
        }
    }

    /// Persist this preference.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot cannot be written.
    pub async fn save(self, storage: &impl Storage) -> Result<(), StorageError> {
        storage.set(THEME, self.as_str()).await
    }

    /// Flip the stored preference and return the new one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot cannot be written.
    pub async fn toggle(storage: &impl Storage) -> Result<Self, StorageError> {
        let next = Self::load(storage).await.toggled();
        next.save(storage).await?;
        Ok(next)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_defaults_to_light() {
        assert_eq!(Theme::load(&MemoryStorage::new()).await, Theme::Light);
    }

    #[tokio::test]
    async fn test_unknown_value_is_light() {
        let storage = MemoryStorage::new();
        storage.set(THEME, "sepia").await.unwrap();
        assert_eq!(Theme::load(&storage).await, Theme::Light);
    }

    #[tokio::test]
    async fn test_toggle_persists() {
        let storage = MemoryStorage::new();
        assert_eq!(Theme::toggle(&storage).await.unwrap(), Theme::Dark);
        assert_eq!(storage.get(THEME).await.unwrap().as_deref(), Some("dark"));
        assert_eq!(Theme::toggle(&storage).await.unwrap(), Theme::Light);
    }
}
