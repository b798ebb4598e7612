//! Application state shared across handlers.

use std::sync::Arc;

use libris_client::{Gateway, GatewayError};

use crate::config::WebConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The gateway held here has no session; each
/// request derives its own with [`Gateway::for_session`].
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    gateway: Gateway,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend base address is unusable.
    pub fn new(config: WebConfig) -> Result<Self, GatewayError> {
        let gateway = Gateway::new(&config.client)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, gateway }),
        })
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get the session-less gateway.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.inner.gateway
    }

    /// Backend base address as a string, for building cover links.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        self.inner.gateway.base_url().as_str()
    }
}
