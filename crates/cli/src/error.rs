//! CLI error type.

use libris_client::controllers::SubmitError;
use libris_client::{ConfigError, GatewayError, SessionError, StorageError};
use thiserror::Error;

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No state directory: set LIBRIS_STATE_DIR or HOME")]
    NoStateDir,

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("Local state error: {0}")]
    Storage(#[from] StorageError),

    /// A form submission failed; the message is ready for display.
    #[error("{0}")]
    Rejected(String),

    #[error("You are not signed in. Run `libris login` first.")]
    NotSignedIn,

    #[error("This command needs an administrator account.")]
    Forbidden,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Turn a submission failure into a displayable error, using the
    /// backend's explanation when it gave one.
    #[must_use]
    pub fn rejected(error: &SubmitError, fallback: &str) -> Self {
        Self::Rejected(error.user_message(fallback))
    }
}
