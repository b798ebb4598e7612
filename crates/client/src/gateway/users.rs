//! Endpoints scoped to the signed-in account.

use libris_core::{ActivityLog, Ebook, UserProfile};
use reqwest::Method;
use tracing::instrument;

use super::Gateway;
use crate::error::GatewayError;

impl Gateway {
    /// `GET /users/me`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, GatewayError> {
        let url = self.endpoint(&["users", "me"])?;
        Self::send_json(self.request(Method::GET, url).await).await
    }

    /// `GET /users/me/history`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn history(&self) -> Result<Vec<ActivityLog>, GatewayError> {
        let url = self.endpoint(&["users", "me", "history"])?;
        Self::send_json(self.request(Method::GET, url).await).await
    }

    /// `GET /users/me/favorites`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn favorites(&self) -> Result<Vec<Ebook>, GatewayError> {
        let url = self.endpoint(&["users", "me", "favorites"])?;
        Self::send_json(self.request(Method::GET, url).await).await
    }
}
