//! Webhook signature computation and verification.
//!
//! Every delivery is signed over the *signed content*
//! `"{id}.{timestamp}.{payload}"`, where `payload` is the raw request body
//! exactly as received. The signature is the base64-encoded HMAC-SHA256 of
//! those bytes under the endpoint's [`WebhookSecret`].
//!
//! Digests are compared with [`subtle::ConstantTimeEq`] so that the time
//! taken does not depend on how many leading bytes of a forged signature
//! happen to be correct.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};

use crate::error::WebhookError;
use crate::event::WebhookEvent;
use crate::secret::WebhookSecret;

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme version tag used in versioned signature headers.
pub const SIGNATURE_VERSION: &str = "v1";

/// The three fields covered by a webhook signature.
///
/// The payload is borrowed as bytes and never re-serialized: reformatting the
/// JSON body (whitespace, key order) changes the bytes and breaks the
/// signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedContent<'a> {
    /// Provider-issued message identifier (`msg_...`).
    pub id: &'a str,
    /// Unix seconds, as the string the provider sent.
    pub timestamp: &'a str,
    /// Raw request body.
    pub payload: &'a [u8],
}

impl<'a> SignedContent<'a> {
    /// Creates the signed content for one delivery.
    pub fn new(
        id: &'a str,
        timestamp: &'a str,
        payload: &'a (impl AsRef<[u8]> + ?Sized),
    ) -> Self {
        Self {
            id,
            timestamp,
            payload: payload.as_ref(),
        }
    }

    /// Returns the exact byte string that is signed: `id.timestamp.payload`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.id.len() + self.timestamp.len() + self.payload.len() + 2);
        out.extend_from_slice(self.id.as_bytes());
        out.push(b'.');
        out.extend_from_slice(self.timestamp.as_bytes());
        out.push(b'.');
        out.extend_from_slice(self.payload);
        out
    }

    /// Computes the raw HMAC-SHA256 digest of this content under `key`.
    fn digest(&self, key: &[u8]) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
        mac.update(self.id.as_bytes());
        mac.update(b".");
        mac.update(self.timestamp.as_bytes());
        mac.update(b".");
        mac.update(self.payload);
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&mac.finalize().into_bytes());
        digest
    }
}

/// Verifies webhook deliveries against one endpoint secret.
///
/// The secret is parsed once up front. The verifier holds no mutable state,
/// so a single instance can be shared across threads and tasks.
///
/// # Example
///
/// ```
/// use blindpay::WebhookVerifier;
///
/// # fn main() -> Result<(), blindpay::WebhookError> {
/// let verifier = WebhookVerifier::new("whsec_dGVzdF9zZWNyZXRfa2V5XzEyMzQ=")?;
/// let body = br#"{"event":"payout.complete","data":{}}"#;
///
/// let signature = verifier.sign("msg_1", "1700000000", body);
/// let header = format!("v1,{signature}");
/// assert!(verifier.verify_header("msg_1", "1700000000", body, &header));
/// assert!(!verifier.verify("msg_1", "1700000001", body, &signature));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookVerifier {
    secret: WebhookSecret,
}

impl WebhookVerifier {
    /// Creates a verifier from a `whsec_<base64>` secret string.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidSecretFormat`] if the secret is malformed.
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        WebhookSecret::parse(secret).map(Self::from_secret)
    }

    /// Creates a verifier from an already parsed secret.
    #[must_use]
    pub const fn from_secret(secret: WebhookSecret) -> Self {
        Self { secret }
    }

    /// Returns the secret this verifier checks against.
    #[must_use]
    pub const fn secret(&self) -> &WebhookSecret {
        &self.secret
    }

    /// Computes the base64 signature BlindPay would send for this delivery.
    #[must_use]
    pub fn sign(&self, id: &str, timestamp: &str, payload: impl AsRef<[u8]>) -> String {
        let content = SignedContent::new(id, timestamp, payload.as_ref());
        b64.encode(content.digest(self.secret.key()))
    }

    /// Checks a single base64 candidate signature.
    ///
    /// Returns `false` both for a wrong signature and for a candidate that is
    /// not valid base64; the two are deliberately indistinguishable.
    #[must_use]
    pub fn verify(
        &self,
        id: &str,
        timestamp: &str,
        payload: impl AsRef<[u8]>,
        candidate: &str,
    ) -> bool {
        let content = SignedContent::new(id, timestamp, payload.as_ref());
        let expected = content.digest(self.secret.key());

        let valid = bool::from(candidate_matches(&expected, candidate));
        #[cfg(feature = "telemetry")]
        if !valid {
            tracing::debug!(webhook_id = id, "Webhook signature verification failed");
        }
        valid
    }

    /// Checks a versioned signature header such as `v1,<sig> v1,<sig>`.
    ///
    /// Entries are separated by whitespace. An entry verifies if it is tagged
    /// `v1` (or carries no tag at all) and its signature matches; entries
    /// with other version tags are skipped. Every entry is compared, so the
    /// position of a matching entry does not affect timing.
    #[must_use]
    pub fn verify_header(
        &self,
        id: &str,
        timestamp: &str,
        payload: impl AsRef<[u8]>,
        header: &str,
    ) -> bool {
        let content = SignedContent::new(id, timestamp, payload.as_ref());
        let expected = content.digest(self.secret.key());

        let mut matched = Choice::from(0);
        for entry in header.split_whitespace() {
            let signature = match entry.split_once(',') {
                Some((SIGNATURE_VERSION, signature)) => signature,
                Some(_) => continue,
                None => entry,
            };
            matched |= candidate_matches(&expected, signature);
        }

        let valid = bool::from(matched);
        #[cfg(feature = "telemetry")]
        if !valid {
            tracing::debug!(webhook_id = id, "No webhook signature in header matched");
        }
        valid
    }

    /// Verifies a delivery and decodes its event envelope.
    ///
    /// `candidate` may be a bare signature or a versioned header, as accepted
    /// by [`Self::verify_header`].
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::SignatureMismatch`] if `candidate` does not
    /// verify, or [`WebhookError::Payload`] if the verified body is not a
    /// valid event envelope.
    pub fn verify_event(
        &self,
        id: &str,
        timestamp: &str,
        payload: impl AsRef<[u8]>,
        candidate: &str,
    ) -> Result<WebhookEvent, WebhookError> {
        let payload = payload.as_ref();
        if !self.verify_header(id, timestamp, payload, candidate) {
            return Err(WebhookError::SignatureMismatch);
        }
        Ok(WebhookEvent::from_slice(payload)?)
    }
}

/// Computes the signature for a delivery from a `whsec_` secret string.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidSecretFormat`] if the secret is malformed.
pub fn sign(
    secret: &str,
    id: &str,
    timestamp: &str,
    payload: impl AsRef<[u8]>,
) -> Result<String, WebhookError> {
    Ok(WebhookVerifier::new(secret)?.sign(id, timestamp, payload))
}

/// Verifies a webhook signature in one call.
///
/// Returns `Ok(true)` iff `candidate_signature` is the base64 HMAC-SHA256 of
/// `"{id}.{timestamp}.{payload}"` under the secret. A mismatched or
/// undecodable candidate yields `Ok(false)`.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidSecretFormat`] if `secret` lacks the
/// `whsec_` prefix or its key is not valid base64. This is a configuration
/// problem and is reported separately from a failed verification.
pub fn verify(
    secret: &str,
    id: &str,
    timestamp: &str,
    payload: impl AsRef<[u8]>,
    candidate_signature: &str,
) -> Result<bool, WebhookError> {
    Ok(WebhookVerifier::new(secret)?.verify(id, timestamp, payload, candidate_signature))
}

/// Decodes a base64 candidate and compares it to `expected` in constant time.
fn candidate_matches(expected: &[u8; 32], candidate: &str) -> Choice {
    b64.decode(candidate)
        .map_or_else(|_| Choice::from(0), |provided| constant_time_eq(expected, &provided))
}

/// Constant-time byte comparison.
///
/// Length is not secret (every valid digest is 32 bytes), so a length
/// mismatch returns early.
fn constant_time_eq(a: &[u8], b: &[u8]) -> Choice {
    if a.len() != b.len() {
        return Choice::from(0);
    }
    a.ct_eq(b)
}
