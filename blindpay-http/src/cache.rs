//! TTL cache for webhook secrets.
//!
//! Webhook secrets change only when an endpoint is rotated, so fetching one
//! per delivery is wasteful. [`SecretCache`] keeps parsed
//! [`WebhookVerifier`]s keyed by endpoint id for a configurable TTL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use blindpay::WebhookVerifier;
use tokio::sync::RwLock;

/// One cached verifier and its expiry.
#[derive(Clone, Debug)]
struct CachedSecret {
    verifier: WebhookVerifier,
    expires_at: Instant,
}

/// A per-endpoint TTL cache of webhook verifiers.
///
/// Each clone has an independent cache state.
#[derive(Debug)]
pub struct SecretCache {
    /// TTL for each entry
    ttl: Duration,
    /// Entries keyed by endpoint id (`RwLock` for read-heavy workload)
    state: RwLock<HashMap<String, CachedSecret>>,
}

impl SecretCache {
    /// Default TTL (10 minutes).
    pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

    /// Creates a new cache with the given TTL. A zero TTL disables caching.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached verifier for `endpoint_id` if still valid.
    pub async fn get(&self, endpoint_id: &str) -> Option<WebhookVerifier> {
        let guard = self.state.read().await;
        let entry = guard.get(endpoint_id)?;
        if Instant::now() < entry.expires_at {
            Some(entry.verifier.clone())
        } else {
            None
        }
    }

    /// Stores a verifier for `endpoint_id` with the configured TTL.
    pub async fn set(&self, endpoint_id: impl Into<String>, verifier: WebhookVerifier) {
        if self.ttl.is_zero() {
            return;
        }
        let mut guard = self.state.write().await;
        guard.insert(
            endpoint_id.into(),
            CachedSecret {
                verifier,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drops the entry for `endpoint_id`, e.g. after a secret rotation.
    pub async fn invalidate(&self, endpoint_id: &str) {
        self.state.write().await.remove(endpoint_id);
    }

    /// Clears the cache.
    pub async fn clear(&self) {
        self.state.write().await.clear();
    }
}

impl Default for SecretCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

impl Clone for SecretCache {
    fn clone(&self) -> Self {
        Self::new(self.ttl)
    }
}
