//! View controllers.
//!
//! Each controller owns the state of one page: it issues gateway calls when
//! the page is shown, holds the result in a [`Resource`](crate::resource::Resource),
//! and handles its submissions. Submissions are validated locally before any
//! request is sent; successful ones either update the local state or return a
//! [`Navigation`].
//!
//! Controllers never render anything themselves. The web frontend and the
//! CLI each present the same state in their own way.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod ebook_detail;
pub mod profile;

use core::fmt;

use libris_core::ValidationError;
use thiserror::Error;

use crate::error::GatewayError;
use crate::routes::Route;
use crate::session::SessionError;

/// Shown when a fetch fails and the backend gave no better explanation.
pub const LOAD_FAILED: &str = "Could not load data from the library. Please try again.";

/// An informational message carried along with a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Downloading needs a signed-in account.
    LoginRequiredForDownload,
    /// Registration succeeded; the user should sign in now.
    Registered,
    SignedOut,
    EbookCreated,
    EbookUpdated,
    EbookDeleted,
}

impl Notice {
    /// Short stable code, suitable for a query string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LoginRequiredForDownload => "login-to-download",
            Self::Registered => "registered",
            Self::SignedOut => "signed-out",
            Self::EbookCreated => "ebook-created",
            Self::EbookUpdated => "ebook-updated",
            Self::EbookDeleted => "ebook-deleted",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        [
            Self::LoginRequiredForDownload,
            Self::Registered,
            Self::SignedOut,
            Self::EbookCreated,
            Self::EbookUpdated,
            Self::EbookDeleted,
        ]
        .into_iter()
        .find(|notice| notice.code() == code)
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoginRequiredForDownload => "You need to sign in before downloading.",
            Self::Registered => "Registration successful. Please sign in.",
            Self::SignedOut => "You have been signed out.",
            Self::EbookCreated => "E-book uploaded.",
            Self::EbookUpdated => "E-book updated.",
            Self::EbookDeleted => "E-book deleted.",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Where to go after a successful action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub notice: Option<Notice>,
}

impl Navigation {
    #[must_use]
    pub const fn to(route: Route) -> Self {
        Self {
            route,
            notice: None,
        }
    }

    #[must_use]
    pub const fn with_notice(route: Route, notice: Notice) -> Self {
        Self {
            route,
            notice: Some(notice),
        }
    }

    /// Target path, with the notice code as a `notice` query parameter.
    #[must_use]
    pub fn href(&self) -> String {
        match self.notice {
            Some(notice) => format!("{}?notice={}", self.route.path(), notice.code()),
            None => self.route.path(),
        }
    }
}

/// Failure of a form submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl SubmitError {
    /// Message to show next to the form.
    ///
    /// Validation messages are shown as is. Backend failures show the
    /// backend's `detail` when it sent one, and `fallback` otherwise.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        let gateway = match self {
            Self::Invalid(e) => return e.to_string(),
            Self::Gateway(e) | Self::Session(SessionError::Gateway(e)) => e,
            Self::Session(_) => return fallback.to_owned(),
        };
        gateway.detail().unwrap_or_else(|| fallback.to_owned())
    }
}
