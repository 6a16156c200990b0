//! Webhook header extraction.
//!
//! BlindPay delivers webhooks through Svix, which puts the message id, send
//! time and signatures in the `svix-id`, `svix-timestamp` and
//! `svix-signature` headers. This module pulls them out of an
//! [`http::HeaderMap`] so they can be handed to a [`WebhookVerifier`].

use blindpay::{WebhookError, WebhookEvent, WebhookVerifier};
use http::HeaderMap;

use crate::constants::{WEBHOOK_ID_HEADER, WEBHOOK_SIGNATURE_HEADER, WEBHOOK_TIMESTAMP_HEADER};
use crate::error::HeaderError;

/// The signing headers of one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHeaders {
    /// Message id (`svix-id`).
    pub id: String,
    /// Send time in Unix seconds (`svix-timestamp`).
    pub timestamp: String,
    /// Signature list (`svix-signature`), e.g. `v1,<base64>`.
    pub signature: String,
}

impl WebhookHeaders {
    /// Reads the signing headers from a request's header map.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] if a header is missing, empty, or not ASCII.
    pub fn from_header_map(headers: &HeaderMap) -> Result<Self, HeaderError> {
        Ok(Self {
            id: required(headers, WEBHOOK_ID_HEADER)?,
            timestamp: required(headers, WEBHOOK_TIMESTAMP_HEADER)?,
            signature: required(headers, WEBHOOK_SIGNATURE_HEADER)?,
        })
    }

    /// Checks the delivery's signatures against the raw request body.
    #[must_use]
    pub fn verify(&self, verifier: &WebhookVerifier, payload: impl AsRef<[u8]>) -> bool {
        verifier.verify_header(&self.id, &self.timestamp, payload, &self.signature)
    }

    /// Verifies the delivery and decodes its event envelope.
    ///
    /// # Errors
    ///
    /// See [`WebhookVerifier::verify_event`].
    pub fn verify_event(
        &self,
        verifier: &WebhookVerifier,
        payload: impl AsRef<[u8]>,
    ) -> Result<WebhookEvent, WebhookError> {
        verifier.verify_event(&self.id, &self.timestamp, payload, &self.signature)
    }
}

impl TryFrom<&HeaderMap> for WebhookHeaders {
    type Error = HeaderError;

    fn try_from(headers: &HeaderMap) -> Result<Self, Self::Error> {
        Self::from_header_map(headers)
    }
}

fn required(headers: &HeaderMap, name: &'static str) -> Result<String, HeaderError> {
    let value = headers.get(name).ok_or(HeaderError::Missing(name))?;
    let value = value.to_str().map_err(|_| HeaderError::Invalid(name))?.trim();
    if value.is_empty() {
        return Err(HeaderError::Empty(name));
    }
    Ok(value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    const SECRET: &str = "whsec_dGVzdF9zZWNyZXRfa2V5XzEyMzQ=";
    const PAYLOAD: &str = r#"{"event":"receiver.new","data":{"id":"rec_000000000000"}}"#;

    fn signed_headers(verifier: &WebhookVerifier) -> HeaderMap {
        let signature = verifier.sign("msg_123456", "1614556800", PAYLOAD);
        let mut headers = HeaderMap::new();
        headers.insert("svix-id", HeaderValue::from_static("msg_123456"));
        headers.insert("svix-timestamp", HeaderValue::from_static("1614556800"));
        headers.insert(
            "svix-signature",
            HeaderValue::from_str(&format!("v1,{signature}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_from_header_map() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let headers = WebhookHeaders::from_header_map(&signed_headers(&verifier)).unwrap();
        assert_eq!(headers.id, "msg_123456");
        assert_eq!(headers.timestamp, "1614556800");
        assert!(headers.signature.starts_with("v1,"));
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let mut map = HeaderMap::new();
        map.insert(
            http::HeaderName::from_static("svix-id"),
            HeaderValue::from_static("msg_1"),
        );
        map.append(
            http::HeaderName::from_bytes(b"Svix-Timestamp").unwrap(),
            HeaderValue::from_static("1"),
        );
        map.append(
            http::HeaderName::from_bytes(b"SVIX-SIGNATURE").unwrap(),
            HeaderValue::from_static("v1,abc="),
        );
        assert!(WebhookHeaders::try_from(&map).is_ok());
    }

    #[test]
    fn test_missing_header() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let mut map = signed_headers(&verifier);
        map.remove("svix-signature");
        assert_eq!(
            WebhookHeaders::from_header_map(&map),
            Err(HeaderError::Missing("svix-signature"))
        );
    }

    #[test]
    fn test_empty_header() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let mut map = signed_headers(&verifier);
        map.insert("svix-id", HeaderValue::from_static("  "));
        assert_eq!(
            WebhookHeaders::from_header_map(&map),
            Err(HeaderError::Empty("svix-id"))
        );
    }

    #[test]
    fn test_non_ascii_header() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let mut map = signed_headers(&verifier);
        map.insert("svix-timestamp", HeaderValue::from_bytes(b"16\xff").unwrap());
        assert_eq!(
            WebhookHeaders::from_header_map(&map),
            Err(HeaderError::Invalid("svix-timestamp"))
        );
    }

    #[test]
    fn test_verify_and_decode() {
        let verifier = WebhookVerifier::new(SECRET).unwrap();
        let headers = WebhookHeaders::from_header_map(&signed_headers(&verifier)).unwrap();

        assert!(headers.verify(&verifier, PAYLOAD));
        assert!(!headers.verify(&verifier, PAYLOAD.replace("rec_", "rex_")));

        let event = headers.verify_event(&verifier, PAYLOAD).unwrap();
        assert_eq!(event.event, "receiver.new");
    }
}
