//! Per-invocation client context.
//!
//! Each run restores the session from the state directory, checks the
//! command's guard, and hands commands a gateway carrying the credential.

use std::path::PathBuf;

use libris_client::guard::{self, GuardDecision};
use libris_client::{ClientConfig, FileStorage, Gateway, Route, Session, SessionState};

use crate::error::CliError;

/// Directory holding `state.json`.
///
/// `LIBRIS_STATE_DIR` when set, otherwise `$HOME/.libris`.
///
/// # Errors
///
/// Returns [`CliError::NoStateDir`] when neither variable is set.
pub fn state_dir() -> Result<PathBuf, CliError> {
    if let Some(dir) = std::env::var_os("LIBRIS_STATE_DIR").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".libris"))
        .ok_or(CliError::NoStateDir)
}

pub struct Context {
    pub session: Session<FileStorage>,
    pub gateway: Gateway,
    pub state: SessionState,
}

impl Context {
    /// Load configuration and restore the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub async fn open() -> Result<Self, CliError> {
        let _ = dotenvy::dotenv();
        let config = ClientConfig::from_env()?;
        Self::with(&config, FileStorage::in_dir(state_dir()?)).await
    }

    /// Context over explicit configuration and storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend address is unusable.
    pub async fn with(config: &ClientConfig, storage: FileStorage) -> Result<Self, CliError> {
        tracing::debug!(path = %storage.path().display(), "Using local state");
        let session = Session::new(storage);
        let state = session.restore().await;
        let gateway = Gateway::new(config)?.for_session(session.handle());
        Ok(Self {
            session,
            gateway,
            state,
        })
    }

    /// Fail unless signed in.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotSignedIn`] for an anonymous session.
    pub fn require_authenticated(&self) -> Result<(), CliError> {
        check(guard::require_authenticated(&self.state))
    }

    /// Fail unless signed in as an administrator.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotSignedIn`] or [`CliError::Forbidden`].
    pub fn require_elevated(&self) -> Result<(), CliError> {
        check(guard::require_elevated(&self.state))
    }
}

fn check(decision: GuardDecision) -> Result<(), CliError> {
    match decision {
        GuardDecision::Render => Ok(()),
        // Restore has finished by the time a command runs
        GuardDecision::Checking | GuardDecision::Redirect(Route::Login) => {
            Err(CliError::NotSignedIn)
        }
        GuardDecision::Redirect(_) => Err(CliError::Forbidden),
    }
}
