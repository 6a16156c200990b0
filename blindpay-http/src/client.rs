//! Async client for the BlindPay REST API.
//!
//! [`BlindPayClient`] owns the connection settings and exposes one generic
//! [`BlindPayClient::request`] call that every resource is built on: it
//! resolves a path against the base URL, attaches authentication, sends an
//! optional JSON body, and decodes the JSON response.
//!
//! ## Error Handling
//!
//! Failures are reported as [`ClientError`] variants tagged with the request
//! line, covering
//! - URL construction
//! - HTTP transport failures
//! - JSON deserialization errors
//! - Non-success statuses, carrying the API's error message

use std::fmt::Display;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Span, instrument};

use crate::cache::SecretCache;
use crate::config::ClientConfig;
use crate::constants::USER_AGENT;
use crate::error::ClientError;
use crate::webhook_endpoints::WebhookEndpoints;

/// Error body returned by the API on non-success statuses.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// A client for the BlindPay API.
///
/// Cloning is cheap: clones share the underlying connection pool but get an
/// independent webhook secret cache.
///
/// # Example
///
/// ```no_run
/// use blindpay_http::{BlindPayClient, ClientConfig};
///
/// # async fn run() -> Result<(), blindpay_http::error::ClientError> {
/// let client = BlindPayClient::try_new(ClientConfig::new("api-key", "in_000000000000"))?;
/// let rails: serde_json::Value = client.get("/available/rails").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BlindPayClient {
    /// Base URL, always ending in `/`
    base_url: Url,
    /// Instance that scopes `/instances/{id}/...` resources
    instance_id: String,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Headers sent with each request
    headers: HeaderMap,
    /// Cache for webhook secrets
    secret_cache: SecretCache,
}

impl BlindPayClient {
    /// Builds a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the configuration is incomplete, the base
    /// URL does not parse, the API key is not a valid header value, or the
    /// HTTP client cannot be built.
    pub fn try_new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        // Normalize: strip trailing slashes and add a single trailing slash
        let mut normalized = config.base_url.trim_end_matches('/').to_owned();
        normalized.push('/');
        let base_url = Url::parse(&normalized).map_err(|source| ClientError::UrlParse {
            context: "Failed to parse base URL".to_owned(),
            source,
        })?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(
            |source| ClientError::InvalidHeaderValue {
                context: "API key",
                source,
            },
        )?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );

        let client = match config.http_client {
            Some(client) => client,
            None => Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(|source| ClientError::Http {
                    context: "Failed to build HTTP client".to_owned(),
                    source,
                })?,
        };

        Ok(Self {
            base_url,
            instance_id: config.instance_id,
            client,
            headers,
            secret_cache: SecretCache::default(),
        })
    }

    /// Builds a client from `BLINDPAY_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`] and [`Self::try_new`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::try_new(ClientConfig::from_env()?)
    }

    /// Returns the base URL used by this client.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the instance id.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Returns a reference to the webhook secret cache.
    pub const fn secret_cache(&self) -> &SecretCache {
        &self.secret_cache
    }

    /// Sets the TTL for cached webhook secrets.
    ///
    /// Default is 10 minutes. Use [`Self::without_secret_cache()`] to disable caching.
    #[must_use]
    pub fn with_secret_cache_ttl(mut self, ttl: Duration) -> Self {
        self.secret_cache = SecretCache::new(ttl);
        self
    }

    /// Disables caching of webhook secrets.
    #[must_use]
    pub fn without_secret_cache(self) -> Self {
        self.with_secret_cache_ttl(Duration::ZERO)
    }

    /// Returns the webhook endpoints resource of this client's instance.
    #[must_use]
    pub const fn webhook_endpoints(&self) -> WebhookEndpoints<'_> {
        WebhookEndpoints::new(self)
    }

    /// Prefixes `suffix` with this client's `/instances/{id}` path.
    #[must_use]
    pub fn instance_path(&self, suffix: &str) -> String {
        format!("/instances/{}{suffix}", self.instance_id)
    }

    /// Resolves an API path (with optional query string) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UrlParse`] if the path cannot be joined.
    pub fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ClientError::UrlParse {
                context: format!("Failed to construct URL for {path}"),
                source,
            })
    }

    /// Sends a request and decodes the JSON response.
    ///
    /// `path` is relative to the base URL, e.g. `/available/rails` or
    /// `/instances/in_.../webhook-endpoints`. A success status with an empty
    /// body decodes as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] for non-success statuses and other
    /// [`ClientError`] variants for transport or decoding failures.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "blindpay.request",
            skip_all,
            fields(
                method = %method,
                path = path,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let context = format!("{method} {path}");
        let url = self.url_for(path)?;

        let mut req = self
            .client
            .request(method, url)
            .headers(self.headers.clone());
        if let Some(body) = body {
            req = req.json(body);
        }

        let http_response = req.send().await.map_err(|source| ClientError::Http {
            context: context.clone(),
            source,
        })?;
        let status = http_response.status();
        let bytes = http_response
            .bytes()
            .await
            .map_err(|source| ClientError::ResponseBodyRead {
                context: context.clone(),
                source,
            })?;

        let result = if status.is_success() {
            decode_body(&bytes)
                .map_err(|source| ClientError::JsonDeserialization { context, source })
        } else {
            Err(ClientError::Api {
                context,
                status,
                message: error_message(&bytes),
            })
        };

        record_result_on_span(&result);

        result
    }

    /// Sends a `GET` request.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    /// Sends a `POST` request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Sends a `PUT` request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Sends a `PATCH` request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// Sends a `DELETE` request without a body.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request::<T, ()>(Method::DELETE, path, None).await
    }
}

/// Converts a [`ClientConfig`] into a [`BlindPayClient`].
impl TryFrom<ClientConfig> for BlindPayClient {
    type Error = ClientError;

    fn try_from(config: ClientConfig) -> Result<Self, Self::Error> {
        Self::try_new(config)
    }
}

/// Decodes a success body, treating an empty body as JSON `null`.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(b"null")
    } else {
        serde_json::from_slice(bytes)
    }
}

/// Extracts the API's error message, falling back to the raw body.
fn error_message(bytes: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(bytes).map_or_else(
        |_| String::from_utf8_lossy(bytes).trim().to_owned(),
        |body| body.message,
    )
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to BlindPay API failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}
