//! Light/dark theme switch.

use axum::http::{HeaderMap, header};
use axum::response::Redirect;
use libris_client::Theme;
use url::Url;

use crate::error::Result;
use crate::middleware::CurrentSession;

/// Path and query of the referring page, or `/`.
///
/// Only the local part of the referer is kept, so the redirect never leaves
/// the site.
fn return_path(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Url::parse(value).ok())
        .map_or_else(
            || "/".to_string(),
            |url| match url.query() {
                Some(query) => format!("{}?{query}", url.path()),
                None => url.path().to_string(),
            },
        )
}

/// Flip the theme and go back to where the switch was pressed.
pub async fn toggle(current: CurrentSession, headers: HeaderMap) -> Result<Redirect> {
    let theme = Theme::toggle(current.session().storage()).await?;
    tracing::debug!(%theme, "Theme switched");
    Ok(Redirect::to(&return_path(&headers)))
}
