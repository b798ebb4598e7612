//! API gateway: the only component that talks to the backend.
//!
//! One [`Gateway`] is bound to one base address. Every request is built
//! through [`Gateway::request`], which reads the session's credential at
//! call time and attaches it as a bearer token when present.
//!
//! Failures are never retried and responses are never cached. A non-success
//! status surfaces as [`GatewayError::Status`] with the raw body.
//!
//! # Submodules
//!
//! - `auth` - Login and registration
//! - `ebooks` - Catalog, reviews and favorites
//! - `users` - Profile, history and favorites of the signed-in account
//! - `admin` - Statistics and monitoring
//! - `download` - Binary downloads and read links

mod admin;
mod auth;
mod download;
mod ebooks;
mod users;

pub use download::Download;
pub use ebooks::CatalogQuery;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::GatewayError;
use crate::session::{SessionHandle, SessionState};

/// Typed client for the library backend.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct Gateway {
    http: Arc<GatewayInner>,
    session: SessionHandle,
}

struct GatewayInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.http.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Create a gateway with no session attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the base address cannot carry paths or the HTTP
    /// client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        if config.api_base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl(
                config.api_base_url.to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("libris/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http: Arc::new(GatewayInner {
                client,
                base_url: config.api_base_url.clone(),
            }),
            session: SessionHandle::with_state(SessionState::anonymous()),
        })
    }

    /// A gateway sharing this one's connection pool that reads its
    /// credential from `session`.
    #[must_use]
    pub fn for_session(&self, session: SessionHandle) -> Self {
        Self {
            http: Arc::clone(&self.http),
            session,
        }
    }

    /// The session this gateway reads its credential from.
    #[must_use]
    pub const fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// The configured backend base address.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.http.base_url
    }

    /// Resolve `segments` against the base address.
    ///
    /// Each segment is percent-encoded; an empty final segment produces a
    /// trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.http.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidBaseUrl(self.http.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request, attaching the current credential if there is one.
    async fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.client.request(method, url);
        match self.session.credential().await {
            Some(credential) => builder.bearer_auth(credential.expose()),
            None => builder,
        }
    }

    /// Send and decode a JSON response body.
    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, GatewayError> {
        let response = Self::send(builder).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send, discarding the response body.
    async fn send_empty(builder: RequestBuilder) -> Result<(), GatewayError> {
        Self::send(builder).await.map(drop)
    }

    /// Send and turn non-success statuses into [`GatewayError::Status`].
    async fn send(builder: RequestBuilder) -> Result<Response, GatewayError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match response.text().await {
            Ok(body) => Err(GatewayError::Status { status, body }),
            Err(e) => Err(GatewayError::Http(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> Gateway {
        Gateway::new(&ClientConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let gw = gateway("http://localhost:8000");
        assert_eq!(
            gw.endpoint(&["ebooks", "7", "reviews"]).unwrap().as_str(),
            "http://localhost:8000/ebooks/7/reviews"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let gw = gateway("http://example.com/api/");
        assert_eq!(
            gw.endpoint(&["users", "me"]).unwrap().as_str(),
            "http://example.com/api/users/me"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let gw = gateway("http://localhost:8000/");
        assert_eq!(
            gw.endpoint(&["ebooks", ""]).unwrap().as_str(),
            "http://localhost:8000/ebooks/"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let gw = gateway("http://localhost:8000");
        assert_eq!(
            gw.endpoint(&["ebooks", "a/b"]).unwrap().as_str(),
            "http://localhost:8000/ebooks/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_opaque_base() {
        let config = ClientConfig::new(Url::parse("mailto:library@example.com").unwrap());
        assert!(matches!(
            Gateway::new(&config),
            Err(GatewayError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_request_without_credential_has_no_auth_header() {
        let gw = gateway("http://localhost:8000");
        let url = gw.endpoint(&["ebooks"]).unwrap();
        let request = gw.request(Method::GET, url).await.build().unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_request_attaches_bearer_token() {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"reader@libris.test"}"#);
        let token = format!("h.{payload}.s");
        let state = SessionState::signed_in(libris_core::Credential::new(token.clone())).unwrap();

        let gw = gateway("http://localhost:8000").for_session(SessionHandle::with_state(state));
        let url = gw.endpoint(&["users", "me"]).unwrap();
        let request = gw.request(Method::GET, url).await.build().unwrap();
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            format!("Bearer {token}").as_str()
        );
    }
}
