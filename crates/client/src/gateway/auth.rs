//! Authentication endpoints.

use libris_core::{Credential, Registration, UserProfile};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::Gateway;
use crate::error::GatewayError;

/// Body of a successful `POST /auth/login`. `token_type` is always `bearer`.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl Gateway {
    /// `POST /auth/login` with form-encoded `username`/`password`.
    ///
    /// The credential is returned as issued; decoding it is the session's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &SecretString,
    ) -> Result<Credential, GatewayError> {
        let url = self.endpoint(&["auth", "login"])?;
        let form = [
            ("username", identifier),
            ("password", password.expose_secret()),
        ];
        let token: TokenResponse =
            Self::send_json(self.request(Method::POST, url).await.form(&form)).await?;
        Ok(Credential::new(token.access_token))
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, e.g. when the email is taken.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, GatewayError> {
        let url = self.endpoint(&["auth", "register"])?;
        Self::send_json(self.request(Method::POST, url).await.json(registration)).await
    }
}
