//! Error types for the HTTP transport layer.

/// Errors that can occur while reading webhook headers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    /// The header is absent.
    #[error("missing webhook header `{0}`")]
    Missing(&'static str),

    /// The header is present but empty.
    #[error("webhook header `{0}` is empty")]
    Empty(&'static str),

    /// The header value is not visible ASCII.
    #[error("webhook header `{0}` is not valid ASCII")]
    Invalid(&'static str),
}

/// Errors that can occur while building a [`crate::ClientConfig`].
#[cfg(feature = "client")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),

    /// A required setting is empty.
    #[error("`{0}` must not be empty")]
    Empty(&'static str),

    /// The timeout is not a whole number of seconds.
    #[error("invalid timeout `{value}`: {source}")]
    InvalidTimeout {
        /// The rejected value.
        value: String,
        /// The underlying parse error.
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Errors that can occur while talking to the BlindPay API.
///
/// `context` fields carry the request line (e.g. `"GET /available/rails"`).
#[cfg(feature = "client")]
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// A configured value cannot be sent as a header.
    #[error("invalid header value: {context}: {source}")]
    InvalidHeaderValue {
        /// Human-readable context.
        context: &'static str,
        /// The underlying header error.
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Failed to read response body.
    #[error("Failed to read response body: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// JSON deserialization error.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: String,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The API answered with a non-success status.
    #[error("API error {status}: {context}: {message}")]
    Api {
        /// Human-readable context.
        context: String,
        /// The HTTP status code.
        status: http::StatusCode,
        /// The API's error message, or the raw body if it sent none.
        message: String,
    },

    /// A fetched webhook secret could not be used.
    #[error("webhook error: {0}")]
    Webhook(#[from] blindpay::WebhookError),
}

#[cfg(feature = "client")]
impl ClientError {
    /// Returns the HTTP status for [`ClientError::Api`] errors.
    #[must_use]
    pub const fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
