//! Webhook secret parsing.
//!
//! BlindPay hands out one secret per webhook endpoint, formatted as the
//! literal tag `whsec_` followed by the base64-encoded HMAC key. The tag is
//! not part of the key and must be stripped before use.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;

use crate::error::WebhookError;

/// Literal tag that prefixes every webhook secret.
pub const SECRET_PREFIX: &str = "whsec_";

/// A decoded webhook signing key.
///
/// The raw key bytes never appear in [`fmt::Debug`] output.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookSecret {
    key: Vec<u8>,
}

impl WebhookSecret {
    /// Parses a `whsec_<base64>` secret string.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidSecretFormat`] if the tag is missing,
    /// nothing follows it, or the remainder is not valid base64.
    pub fn parse(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret
            .strip_prefix(SECRET_PREFIX)
            .ok_or(WebhookError::invalid_secret("missing `whsec_` prefix"))?;
        if encoded.is_empty() {
            return Err(WebhookError::invalid_secret("empty key after `whsec_` prefix"));
        }
        let key = b64
            .decode(encoded)
            .map_err(|_| WebhookError::invalid_secret("key is not valid base64"))?;
        Ok(Self { key })
    }

    /// Wraps raw key bytes.
    pub fn from_key_bytes(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    /// Returns the raw HMAC key.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Re-encodes the key in its `whsec_<base64>` string form.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{SECRET_PREFIX}{}", b64.encode(&self.key))
    }
}

impl FromStr for WebhookSecret {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for WebhookSecret {
    type Error = WebhookError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSecret")
            .field("key_len", &self.key.len())
            .finish_non_exhaustive()
    }
}
