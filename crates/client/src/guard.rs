//! Route guards.
//!
//! Pure functions of the session state: they never touch storage or the
//! network, and they never redirect before the session is ready.

use crate::routes::Route;
use crate::session::SessionState;

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Any signed-in identity.
    Authenticated,
    /// Signed-in identity with the `admin` role.
    Elevated,
}

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restoration is still running; show a placeholder.
    Checking,
    Render,
    Redirect(Route),
}

/// Decide whether a route with `access` may render for `state`.
#[must_use]
pub fn evaluate(access: Access, state: &SessionState) -> GuardDecision {
    if access == Access::Public {
        return GuardDecision::Render;
    }
    if !state.is_ready() {
        return GuardDecision::Checking;
    }
    let Some(identity) = state.identity() else {
        return GuardDecision::Redirect(Route::Login);
    };
    if access == Access::Elevated && !identity.is_admin() {
        return GuardDecision::Redirect(Route::Home);
    }
    GuardDecision::Render
}

/// Guard for routes that need any signed-in identity.
#[must_use]
pub fn require_authenticated(state: &SessionState) -> GuardDecision {
    evaluate(Access::Authenticated, state)
}

/// Guard for routes that need the `admin` role.
#[must_use]
pub fn require_elevated(state: &SessionState) -> GuardDecision {
    evaluate(Access::Elevated, state)
}
