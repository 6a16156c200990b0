#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the BlindPay payments API.
//!
//! This crate holds the pieces of the SDK that do not touch the network. Its
//! main job is authenticating inbound webhook deliveries: BlindPay signs every
//! delivery with HMAC-SHA256 over `"{id}.{timestamp}.{payload}"`, keyed with
//! the per-endpoint `whsec_` secret.
//!
//! # Overview
//!
//! ```
//! use blindpay::WebhookVerifier;
//!
//! # fn main() -> Result<(), blindpay::WebhookError> {
//! let secret = "whsec_dGVzdF9zZWNyZXRfa2V5XzEyMzQ=";
//! let payload = br#"{"event":"receiver.new","data":{"id":"rec_000000000000"}}"#;
//!
//! let verifier = WebhookVerifier::new(secret)?;
//! let signature = verifier.sign("msg_123456", "1614556800", payload);
//! assert!(verifier.verify("msg_123456", "1614556800", payload, &signature));
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`error`] - Error types for secret parsing and event decoding
//! - [`event`] - The JSON envelope carried by webhook deliveries
//! - [`secret`] - Parsing of `whsec_` webhook secrets
//! - [`signature`] - Signature computation and constant-time verification
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing of verification failures

pub mod error;
pub mod event;
pub mod secret;
pub mod signature;

pub use error::WebhookError;
pub use event::WebhookEvent;
pub use secret::WebhookSecret;
pub use signature::{SignedContent, WebhookVerifier, sign, verify};
