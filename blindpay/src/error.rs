//! Error types for webhook handling.

/// Errors raised while preparing or checking a webhook delivery.
///
/// A signature that simply does not match is *not* an error for
/// [`crate::verify`]; it returns `Ok(false)`. Only misconfiguration is
/// surfaced here, plus the two failure modes of
/// [`crate::WebhookVerifier::verify_event`].
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The webhook secret is not of the form `whsec_<base64>`.
    #[error("invalid webhook secret format: {reason}")]
    InvalidSecretFormat {
        /// What was wrong with the secret.
        reason: &'static str,
    },

    /// The delivery's signature did not match the expected one.
    #[error("webhook signature mismatch")]
    SignatureMismatch,

    /// The payload verified but is not a valid event envelope.
    #[error("invalid webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl WebhookError {
    /// Creates an [`WebhookError::InvalidSecretFormat`] error.
    #[must_use]
    pub const fn invalid_secret(reason: &'static str) -> Self {
        Self::InvalidSecretFormat { reason }
    }

    /// Returns `true` if this error indicates a misconfigured secret.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidSecretFormat { .. })
    }
}
