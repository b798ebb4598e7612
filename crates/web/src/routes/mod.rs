//! HTTP route handlers for the web frontend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Catalog with search
//! GET  /health                        - Health check
//! POST /theme                         - Toggle light/dark theme
//!
//! # Auth
//! GET  /login                         - Login page (shows redirect notices)
//! POST /login                         - Login action
//! GET  /register                      - Register page
//! POST /register                      - Register action
//! POST /logout                        - Logout action
//!
//! # E-books
//! GET  /ebook/{id}                    - Detail with reviews
//! POST /ebook/{id}/reviews            - Add review (requires auth)
//! GET  /ebook/{id}/download           - Download (redirects to login when signed out)
//!
//! # Account (requires auth)
//! GET  /profile                       - Profile and activity history
//!
//! # Admin (requires admin role)
//! GET  /admin/dashboard               - Statistics summary
//! GET  /admin/ebooks                  - Catalog management
//! GET  /admin/ebooks/new              - Upload form
//! POST /admin/ebooks/new              - Upload action (multipart)
//! GET  /admin/ebooks/edit/{id}        - Edit form
//! POST /admin/ebooks/edit/{id}        - Edit action
//! POST /admin/ebooks/{id}/delete      - Delete action
//! ```

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod ebooks;
pub mod profile;
pub mod theme;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use libris_client::GatewayError;
use libris_client::controllers::{LOAD_FAILED, Notice};
use serde::Deserialize;

use crate::state::AppState;

/// Largest accepted upload (content file plus cover).
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Query carrying a notice code from a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

impl NoticeQuery {
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.notice.as_deref().and_then(Notice::from_code)
    }
}

/// Inline message for a failed fetch.
pub(crate) fn load_error(e: &GatewayError) -> String {
    tracing::warn!(error = %e, "Backend fetch failed");
    e.detail().unwrap_or_else(|| LOAD_FAILED.to_string())
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/ebooks", get(admin::index))
        .route(
            "/ebooks/new",
            get(admin::new_page)
                .post(admin::create)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/ebooks/edit/{id}", get(admin::edit_page).post(admin::update))
        .route("/ebooks/{id}/delete", post(admin::delete))
}

/// Create the e-book routes router.
pub fn ebook_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(ebooks::show))
        .route("/{id}/reviews", post(ebooks::add_review))
        .route("/{id}/download", get(ebooks::download))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/profile", get(profile::show))
        .route("/theme", post(theme::toggle))
        .nest("/ebook", ebook_routes())
        .nest("/admin", admin_routes())
}
