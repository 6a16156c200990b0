//! Webhook event envelope.

use serde::{Deserialize, Serialize};

/// A decoded webhook delivery body.
///
/// BlindPay wraps every notification as `{"event": "<type>", "data": {...}}`.
/// The `data` object depends on the event type (`receiver.new`,
/// `payout.update`, ...) and is kept as raw JSON.
///
/// Only decode a body after its signature has been verified, see
/// [`crate::WebhookVerifier::verify_event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event type, e.g. `receiver.new`.
    pub event: String,
    /// Event-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WebhookEvent {
    /// Decodes an event envelope from raw body bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the body is not a valid envelope.
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Returns the resource family of the event, the part before the first `.`.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.event
            .split_once('.')
            .map_or(self.event.as_str(), |(resource, _)| resource)
    }

    /// Deserializes `data` into a caller-supplied type.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if `data` does not match `T`.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}
