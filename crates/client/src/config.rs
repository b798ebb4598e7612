//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LIBRIS_API_BASE_URL` - Backend base address (default: `http://localhost:8000`)
//! - `LIBRIS_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend address, matching the backend's development server.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Settings for the API gateway.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address every backend path is resolved against
    pub api_base_url: Url,
    /// Timeout applied to each outbound request
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration for a backend at `api_base_url` with default settings.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("LIBRIS_API_BASE_URL", DEFAULT_API_BASE_URL);
        let api_base_url = Url::parse(&api_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("LIBRIS_API_BASE_URL".to_string(), e.to_string())
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "LIBRIS_API_BASE_URL".to_string(),
                "must be an http(s) address".to_string(),
            ));
        }

        let timeout = get_env_or_default("LIBRIS_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LIBRIS_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout),
        })
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
