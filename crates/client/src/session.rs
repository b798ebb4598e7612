//! Session store.
//!
//! Owns the current credential, the identity decoded from it, and the
//! `ready` flag that route guards wait on. The credential is persisted in the
//! [`TOKEN`] storage slot so a session survives a restart.
//!
//! The identity is always a pure function of the stored credential: it is
//! never fetched and never persisted on its own.

use std::sync::Arc;

use chrono::Utc;
use libris_core::{Credential, DecodeError, Identity, decode_identity};
use secrecy::SecretString;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::storage::{Storage, StorageError, TOKEN};

/// Errors from [`Session::login`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("backend issued an unreadable credential: {0}")]
    Credential(#[from] DecodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The `(credential, identity, ready)` triple.
///
/// Fields are private so the identity can only ever be produced by decoding
/// the credential held alongside it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    credential: Option<Credential>,
    identity: Option<Identity>,
    ready: bool,
}

impl SessionState {
    /// Initial state: restoration has not finished yet.
    #[must_use]
    pub const fn restoring() -> Self {
        Self {
            credential: None,
            identity: None,
            ready: false,
        }
    }

    /// Restoration finished without a usable credential.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            credential: None,
            identity: None,
            ready: true,
        }
    }

    /// Restoration finished with `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the credential does not decode.
    pub fn signed_in(credential: Credential) -> Result<Self, DecodeError> {
        let identity = decode_identity(&credential)?;
        Ok(Self {
            credential: Some(credential),
            identity: Some(identity),
            ready: true,
        })
    }

    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_admin)
    }
}

impl PartialEq for SessionState {
    fn eq(&self, other: &Self) -> bool {
        self.ready == other.ready
            && self.identity == other.identity
            && self.credential.as_ref().map(Credential::expose)
                == other.credential.as_ref().map(Credential::expose)
    }
}

impl Eq for SessionState {}

/// Shared read access to a session's state.
///
/// The gateway holds one of these and reads the credential at call time.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<RwLock<SessionState>>);

impl SessionHandle {
    /// A handle over a fixed state, detached from any [`Session`].
    #[must_use]
    pub fn with_state(state: SessionState) -> Self {
        Self(Arc::new(RwLock::new(state)))
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> SessionState {
        self.0.read().await.clone()
    }

    /// The current credential, if any.
    pub async fn credential(&self) -> Option<Credential> {
        self.0.read().await.credential.clone()
    }
}

/// A session over a storage backend.
pub struct Session<S> {
    storage: S,
    state: SessionHandle,
}

impl<S: Storage> Session<S> {
    /// A session that has not been restored yet.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            state: SessionHandle::with_state(SessionState::restoring()),
        }
    }

    /// Handle for components that only read the session.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.state.clone()
    }

    /// The storage backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Copy of the current state.
    pub async fn state(&self) -> SessionState {
        self.state.snapshot().await
    }

    /// Restore the session from storage.
    ///
    /// Undecodable or expired credentials are erased, and so is a corrupt
    /// store. Always leaves the session ready, including when storage cannot
    /// be read. Calling this on a session that is already ready changes
    /// nothing.
    pub async fn restore(&self) -> SessionState {
        let mut state = self.state.0.write().await;
        if state.ready {
            return state.clone();
        }

        *state = match self.storage.get(TOKEN).await {
            Ok(Some(token)) => self.adopt(Credential::new(token)).await,
            Ok(None) => SessionState::anonymous(),
            Err(e @ StorageError::Format(_)) => {
                warn!(error = %e, "Stored credential is unreadable, discarding");
                if let Err(e) = self.storage.remove(TOKEN).await {
                    warn!(error = %e, "Could not erase stored credential");
                }
                SessionState::anonymous()
            }
            Err(e) => {
                warn!(error = %e, "Could not read stored credential");
                SessionState::anonymous()
            }
        };
        state.clone()
    }

    async fn adopt(&self, credential: Credential) -> SessionState {
        let reason = match SessionState::signed_in(credential) {
            Ok(state) => match state.identity() {
                Some(identity) if identity.is_expired_at(Utc::now()) => "expired",
                _ => return state,
            },
            Err(e) => {
                warn!(error = %e, "Stored credential does not decode");
                "undecodable"
            }
        };

        info!(reason, "Discarding stored credential");
        if let Err(e) = self.storage.remove(TOKEN).await {
            warn!(error = %e, "Could not erase stored credential");
        }
        SessionState::anonymous()
    }

    /// Authenticate against the backend and adopt the issued credential.
    ///
    /// On any failure the session is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if authentication fails, the credential does
    /// not decode, or it cannot be persisted.
    #[instrument(skip(self, gateway, password))]
    pub async fn login(
        &self,
        gateway: &Gateway,
        identifier: &str,
        password: &SecretString,
    ) -> Result<SessionState, SessionError> {
        let credential = gateway.authenticate(identifier, password).await?;
        let next = SessionState::signed_in(credential)?;
        if let Some(credential) = next.credential() {
            self.storage.set(TOKEN, credential.expose()).await?;
        }

        *self.state.0.write().await = next.clone();
        info!(role = ?next.identity().map(|i| i.role), "Signed in");
        Ok(next)
    }

    /// Forget the credential. Idempotent.
    ///
    /// In-memory state is cleared even when storage fails.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the stored credential could not be erased.
    pub async fn logout(&self) -> Result<(), StorageError> {
        *self.state.0.write().await = SessionState::anonymous();
        let result = self.storage.remove(TOKEN).await;
        match &result {
            Ok(()) => info!("Signed out"),
            Err(e) => warn!(error = %e, "Could not erase stored credential"),
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use libris_core::Role;

    use super::*;
    use crate::storage::MemoryStorage;

    fn token(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.signature")
    }

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 3600
    }

    /// Storage whose every operation fails.
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Backend("offline".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("offline".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_new_session_is_not_ready() {
        let session = Session::new(MemoryStorage::new());
        assert_eq!(session.state().await, SessionState::restoring());
    }

    #[tokio::test]
    async fn test_restore_without_credential() {
        let session = Session::new(MemoryStorage::new());
        let state = session.restore().await;
        assert!(state.is_ready());
        assert!(state.identity().is_none());
    }

    #[tokio::test]
    async fn test_restore_valid_credential() {
        let storage = MemoryStorage::new();
        storage
            .set(
                TOKEN,
                &token(&serde_json::json!({"sub": "admin@libris.test", "role": "admin", "exp": future_exp()})),
            )
            .await
            .unwrap();

        let session = Session::new(storage);
        let state = session.restore().await;
        assert!(state.is_ready());
        assert!(state.is_admin());
        assert_eq!(state.identity().unwrap().subject, "admin@libris.test");
    }

    #[tokio::test]
    async fn test_restore_discards_undecodable_credential() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN, "garbage").await.unwrap();

        let session = Session::new(storage.clone());
        let state = session.restore().await;
        assert!(state.is_ready());
        assert!(state.identity().is_none());
        assert!(state.credential().is_none());
        assert_eq!(storage.get(TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_discards_expired_credential() {
        let storage = MemoryStorage::new();
        storage
            .set(TOKEN, &token(&serde_json::json!({"sub": "a@b.co", "exp": 1_000})))
            .await
            .unwrap();

        let session = Session::new(storage.clone());
        assert!(!session.restore().await.is_authenticated());
        assert_eq!(storage.get(TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_survives_storage_failure() {
        let session = Session::new(BrokenStorage);
        let state = session.restore().await;
        assert_eq!(state, SessionState::anonymous());
    }

    #[tokio::test]
    async fn test_restore_runs_once() {
        let storage = MemoryStorage::new();
        let session = Session::new(storage.clone());
        session.restore().await;

        storage
            .set(TOKEN, &token(&serde_json::json!({"sub": "late@b.co", "exp": future_exp()})))
            .await
            .unwrap();
        assert!(!session.restore().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let storage = MemoryStorage::new();
        storage
            .set(TOKEN, &token(&serde_json::json!({"sub": "a@b.co", "exp": future_exp()})))
            .await
            .unwrap();
        let session = Session::new(storage.clone());
        session.restore().await;

        session.logout().await.unwrap();
        session.logout().await.unwrap();
        assert_eq!(session.state().await, SessionState::anonymous());
        assert_eq!(storage.get(TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_memory_when_storage_fails() {
        let session = Session::new(BrokenStorage);
        *session.state.0.write().await =
            SessionState::signed_in(Credential::new(token(&serde_json::json!({"sub": "a@b.co"}))))
                .unwrap();

        assert!(session.logout().await.is_err());
        assert!(!session.state().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_handle_sees_updates() {
        let session = Session::new(MemoryStorage::new());
        let handle = session.handle();
        assert!(!handle.snapshot().await.is_ready());
        session.restore().await;
        assert!(handle.snapshot().await.is_ready());
        assert!(handle.credential().await.is_none());
    }

    #[test]
    fn test_signed_in_derives_identity() {
        let state =
            SessionState::signed_in(Credential::new(token(&serde_json::json!({"sub": "u@b.co"})))).unwrap();
        assert!(state.is_ready());
        assert_eq!(state.identity().unwrap().role, Role::User);
        assert!(SessionState::signed_in(Credential::new("x.y")).is_err());
    }
}
