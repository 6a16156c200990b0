//! Client configuration.
//!
//! A [`ClientConfig`] is built either in code or from the process
//! environment:
//!
//! - `BLINDPAY_API_KEY` — API key (required)
//! - `BLINDPAY_INSTANCE_ID` — instance id, `in_...` (required)
//! - `BLINDPAY_BASE_URL` — override the API base URL
//! - `BLINDPAY_TIMEOUT_SECS` — override the request timeout

use std::time::Duration;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, ENV_API_KEY, ENV_BASE_URL, ENV_INSTANCE_ID,
    ENV_TIMEOUT_SECS,
};
use crate::error::ConfigError;

/// Configuration for [`crate::BlindPayClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// API key, sent as a bearer token.
    pub api_key: String,

    /// Instance id that scopes instance-level resources.
    pub instance_id: String,

    /// API base URL (default: [`DEFAULT_BASE_URL`]).
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Optional pre-configured reqwest client. If `None`, a new client is
    /// created with the configured timeout.
    pub http_client: Option<reqwest::Client>,
}

impl ClientConfig {
    /// Creates a config with default base URL and timeout.
    pub fn new(api_key: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            instance_id: instance_id.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            http_client: None,
        }
    }

    /// Loads configuration from `BLINDPAY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or empty,
    /// or the timeout is not an integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::MissingVar(ENV_API_KEY))?;
        let instance_id =
            lookup(ENV_INSTANCE_ID).ok_or(ConfigError::MissingVar(ENV_INSTANCE_ID))?;

        let mut config = Self::new(api_key, instance_id);
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|source| ConfigError::InvalidTimeout { value, source })?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Checks that the required settings are present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] for a blank API key, instance id or
    /// base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Empty("api_key"));
        }
        if self.instance_id.trim().is_empty() {
            return Err(ConfigError::Empty("instance_id"));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Empty("base_url"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("instance_id", &self.instance_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("has_http_client", &self.http_client.is_some())
            .finish()
    }
}
