//! Session extractors and route guards.
//!
//! [`CurrentSession`] restores the client session from the browser's session
//! cookie for every request, so by the time a handler runs the session is
//! always ready. [`RequireAuth`] and [`RequireAdmin`] run the route guards on
//! top of it and turn redirect decisions into HTTP redirects.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use libris_client::controllers::Notice;
use libris_client::guard::{self, GuardDecision};
use libris_client::{Gateway, Route, Session, SessionState, Theme};

use crate::error::AppError;
use crate::state::AppState;
use crate::storage::SessionStorage;
use crate::views::Layout;

/// The restored client session for this request.
pub struct CurrentSession {
    session: Session<SessionStorage>,
    gateway: Gateway,
    state: SessionState,
    theme: Theme,
}

impl CurrentSession {
    /// The client session, for login and logout.
    #[must_use]
    pub const fn session(&self) -> &Session<SessionStorage> {
        &self.session
    }

    /// Gateway that carries this session's credential.
    #[must_use]
    pub const fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Session state as restored at the start of the request.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Page chrome for this session.
    #[must_use]
    pub fn layout(&self, notice: Option<Notice>) -> Layout {
        Layout {
            is_authenticated: self.state.is_authenticated(),
            is_admin: self.state.is_admin(),
            subject: self.state.identity().map(|i| i.subject.clone()),
            theme: self.theme,
            notice: notice.map(Notice::message),
        }
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let cookie_session = parts
            .extensions
            .get::<tower_sessions::Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        let session = Session::new(SessionStorage::new(cookie_session));
        let restored = session.restore().await;
        let theme = Theme::load(session.storage()).await;
        let gateway = state.gateway().for_session(session.handle());

        if let Some(identity) = restored.identity() {
            tracing::Span::current().record("user", identity.subject.as_str());
        }

        Ok(Self {
            session,
            gateway,
            state: restored,
            theme,
        })
    }
}

/// Rejection produced by a route guard.
pub enum GuardRejection {
    /// Guard decided to send the browser elsewhere.
    Redirect(Route),
    /// Session not ready yet.
    Checking,
    Failed(AppError),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(route) => Redirect::to(&route.path()).into_response(),
            Self::Checking => (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::RETRY_AFTER, "1")],
                "Checking your session...",
            )
                .into_response(),
            Self::Failed(e) => e.into_response(),
        }
    }
}

fn apply(decision: GuardDecision, current: CurrentSession) -> Result<CurrentSession, GuardRejection> {
    match decision {
        GuardDecision::Render => Ok(current),
        GuardDecision::Checking => Err(GuardRejection::Checking),
        GuardDecision::Redirect(route) => Err(GuardRejection::Redirect(route)),
    }
}

/// Extractor for pages that need a signed-in user.
///
/// Anonymous visitors are redirected to the login page.
pub struct RequireAuth(pub CurrentSession);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentSession::from_request_parts(parts, state)
            .await
            .map_err(GuardRejection::Failed)?;
        let decision = guard::require_authenticated(current.state());
        apply(decision, current).map(Self)
    }
}

/// Extractor for administrator pages.
///
/// Anonymous visitors go to the login page; signed-in non-admins go home.
pub struct RequireAdmin(pub CurrentSession);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentSession::from_request_parts(parts, state)
            .await
            .map_err(GuardRejection::Failed)?;
        let decision = guard::require_elevated(current.state());
        apply(decision, current).map(Self)
    }
}
