//! Webhook endpoint management.
//!
//! Endpoints are registered per instance under
//! `/instances/{instance_id}/webhook-endpoints`. Each endpoint has its own
//! signing secret, which [`WebhookEndpoints::verifier`] fetches and caches.

use blindpay::{WebhookError, WebhookSecret, WebhookVerifier};
use serde::{Deserialize, Serialize};

use crate::client::BlindPayClient;
use crate::error::ClientError;

/// Request body for registering a webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWebhookEndpoint {
    /// HTTPS URL that receives deliveries.
    pub url: String,
    /// Event types to subscribe to, e.g. `receiver.new`.
    pub events: Vec<String>,
}

impl CreateWebhookEndpoint {
    /// Creates a request for `url` subscribed to `events`.
    pub fn new<I, S>(url: impl Into<String>, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            url: url.into(),
            events: events.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response to [`WebhookEndpoints::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedWebhookEndpoint {
    /// Id of the new endpoint (`we_...`).
    pub id: String,
}

/// A registered webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    /// Endpoint id (`we_...`).
    pub id: String,
    /// Delivery URL.
    pub url: String,
    /// Subscribed event types.
    #[serde(default)]
    pub events: Vec<String>,
    /// Time of the last delivery, if any.
    #[serde(default)]
    pub last_event_at: Option<String>,
    /// Owning instance.
    pub instance_id: String,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
}

/// The signing secret of an endpoint, as returned by the API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSecretKey {
    /// Secret in `whsec_<base64>` form.
    pub key: String,
}

impl WebhookSecretKey {
    /// Parses the secret.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidSecretFormat`] if the key is malformed.
    pub fn parse(&self) -> Result<WebhookSecret, WebhookError> {
        WebhookSecret::parse(&self.key)
    }
}

impl std::fmt::Debug for WebhookSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSecretKey")
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Response to [`WebhookEndpoints::get_portal_access_url`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalAccess {
    /// One-time URL of the hosted webhook portal.
    pub url: String,
}

/// The webhook endpoints resource of one instance.
#[derive(Debug, Clone, Copy)]
pub struct WebhookEndpoints<'a> {
    client: &'a BlindPayClient,
}

impl<'a> WebhookEndpoints<'a> {
    pub(crate) const fn new(client: &'a BlindPayClient) -> Self {
        Self { client }
    }

    fn path(&self, suffix: &str) -> String {
        self.client
            .instance_path(&format!("/webhook-endpoints{suffix}"))
    }

    /// Registers a new webhook endpoint.
    ///
    /// # Errors
    ///
    /// See [`BlindPayClient::request`].
    pub async fn create(
        &self,
        input: &CreateWebhookEndpoint,
    ) -> Result<CreatedWebhookEndpoint, ClientError> {
        self.client.post(&self.path(""), input).await
    }

    /// Lists the instance's webhook endpoints.
    ///
    /// # Errors
    ///
    /// See [`BlindPayClient::request`].
    pub async fn list(&self) -> Result<Vec<WebhookEndpoint>, ClientError> {
        self.client.get(&self.path("")).await
    }

    /// Deletes an endpoint and drops its cached secret.
    ///
    /// # Errors
    ///
    /// See [`BlindPayClient::request`].
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let _: Option<serde_json::Value> = self.client.delete(&self.path(&format!("/{id}"))).await?;
        self.client.secret_cache().invalidate(id).await;
        Ok(())
    }

    /// Fetches an endpoint's signing secret.
    ///
    /// # Errors
    ///
    /// See [`BlindPayClient::request`].
    pub async fn get_secret(&self, id: &str) -> Result<WebhookSecretKey, ClientError> {
        self.client.get(&self.path(&format!("/{id}/secret"))).await
    }

    /// Fetches a URL for the hosted webhook portal.
    ///
    /// # Errors
    ///
    /// See [`BlindPayClient::request`].
    pub async fn get_portal_access_url(&self) -> Result<PortalAccess, ClientError> {
        self.client.get(&self.path("/portal-access")).await
    }

    /// Returns a verifier for deliveries to endpoint `id`.
    ///
    /// The secret is served from the client's [`crate::cache::SecretCache`]
    /// while fresh and fetched with [`Self::get_secret`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the secret cannot be fetched, or
    /// [`ClientError::Webhook`] if the API returned a malformed secret.
    pub async fn verifier(&self, id: &str) -> Result<WebhookVerifier, ClientError> {
        let cache = self.client.secret_cache();
        if let Some(verifier) = cache.get(id).await {
            return Ok(verifier);
        }

        #[cfg(feature = "telemetry")]
        tracing::info!(endpoint_id = id, "blindpay.webhook_secret_cache_miss");

        let secret = self.get_secret(id).await?.parse()?;
        let verifier = WebhookVerifier::from_secret(secret);
        cache.set(id, verifier.clone()).await;
        Ok(verifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "whsec_dGVzdF9zZWNyZXRfa2V5XzEyMzQ=";
    const BASE: &str = "/v1/instances/in_000000000000/webhook-endpoints";

    fn test_client(server: &MockServer) -> BlindPayClient {
        let config = ClientConfig::new("test-key", "in_000000000000")
            .with_base_url(format!("{}/v1", server.uri()));
        BlindPayClient::try_new(config).unwrap()
    }

    async fn mount_secret(server: &MockServer, key: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/we_000000000000/secret")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": key})))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_create() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BASE))
            .and(body_json(json!({
                "url": "https://example.com/webhook",
                "events": ["receiver.new"],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "we_000000000000"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let created = client
            .webhook_endpoints()
            .create(&CreateWebhookEndpoint::new(
                "https://example.com/webhook",
                ["receiver.new"],
            ))
            .await
            .unwrap();
        assert_eq!(created.id, "we_000000000000");
    }

    #[tokio::test]
    async fn test_list() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "we_000000000000",
                "url": "https://example.com/webhook",
                "events": ["receiver.new"],
                "last_event_at": "2024-01-01T00:00:00.000Z",
                "instance_id": "in_000000000000",
                "created_at": "2021-01-01T00:00:00Z",
                "updated_at": "2021-01-01T00:00:00Z",
            }])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let endpoints = client.webhook_endpoints().list().await.unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].events, vec!["receiver.new".to_owned()]);
        assert_eq!(
            endpoints[0].last_event_at.as_deref(),
            Some("2024-01-01T00:00:00.000Z")
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/we_000000000000")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        client
            .webhook_endpoints()
            .delete("we_000000000000")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_secret() {
        let mock_server = MockServer::start().await;
        mount_secret(&mock_server, "whsec_000000000000", 1).await;

        let client = test_client(&mock_server);
        let secret = client
            .webhook_endpoints()
            .get_secret("we_000000000000")
            .await
            .unwrap();
        assert_eq!(secret.key, "whsec_000000000000");
        assert!(!format!("{secret:?}").contains("000000000000"));
    }

    #[tokio::test]
    async fn test_get_portal_access_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{BASE}/portal-access")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"url": "https://example.com/webhook"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let portal = client
            .webhook_endpoints()
            .get_portal_access_url()
            .await
            .unwrap();
        assert_eq!(portal.url, "https://example.com/webhook");
    }

    #[tokio::test]
    async fn test_verifier_uses_fetched_secret_and_caches_it() {
        let mock_server = MockServer::start().await;
        mount_secret(&mock_server, SECRET, 1).await;

        let client = test_client(&mock_server);
        let endpoints = client.webhook_endpoints();

        let payload = r#"{"event":"receiver.new","data":{"id":"rec_000000000000"}}"#;
        let signature = blindpay::sign(SECRET, "msg_123456", "1614556800", payload).unwrap();

        let first = endpoints.verifier("we_000000000000").await.unwrap();
        assert!(first.verify("msg_123456", "1614556800", payload, &signature));

        // Served from cache; the mock expects exactly one fetch.
        let second = endpoints.verifier("we_000000000000").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_verifier_without_cache_refetches() {
        let mock_server = MockServer::start().await;
        mount_secret(&mock_server, SECRET, 2).await;

        let client = test_client(&mock_server).without_secret_cache();
        let endpoints = client.webhook_endpoints();
        endpoints.verifier("we_000000000000").await.unwrap();
        endpoints.verifier("we_000000000000").await.unwrap();
    }

    #[tokio::test]
    async fn test_verifier_refetches_after_ttl() {
        let mock_server = MockServer::start().await;
        mount_secret(&mock_server, SECRET, 2).await;

        let client = test_client(&mock_server).with_secret_cache_ttl(Duration::from_millis(1));
        let endpoints = client.webhook_endpoints();
        endpoints.verifier("we_000000000000").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        endpoints.verifier("we_000000000000").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_invalidates_cached_secret() {
        let mock_server = MockServer::start().await;
        mount_secret(&mock_server, SECRET, 2).await;

        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/we_000000000000")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let endpoints = client.webhook_endpoints();
        endpoints.verifier("we_000000000000").await.unwrap();
        endpoints.delete("we_000000000000").await.unwrap();
        assert!(client.secret_cache().get("we_000000000000").await.is_none());
        endpoints.verifier("we_000000000000").await.unwrap();
    }

    #[tokio::test]
    async fn test_verifier_rejects_malformed_secret() {
        let mock_server = MockServer::start().await;
        mount_secret(&mock_server, "not-a-secret", 1).await;

        let client = test_client(&mock_server);
        let err = client
            .webhook_endpoints()
            .verifier("we_000000000000")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Webhook(WebhookError::InvalidSecretFormat { .. })
        ));
        assert!(client.secret_cache().get("we_000000000000").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{BASE}/we_missing/secret")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let err = client
            .webhook_endpoints()
            .get_secret("we_missing")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
    }
}
