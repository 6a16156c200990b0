//! HTTP transport layer for the BlindPay payments API.
//!
//! Provides webhook header extraction and (feature-gated) an async client
//! for the REST API.
//!
//! # Modules
//!
//! - [`constants`] — Default URLs, environment variable and header names
//! - [`error`] — Transport, configuration and header error types
//! - [`headers`] — Extraction of webhook headers from an [`http::HeaderMap`]
//! - [`config`] — Client configuration (feature: `client`)
//! - [`client`] — Async API client and generic request helpers (feature: `client`)
//! - [`cache`] — TTL cache for webhook secrets (feature: `client`)
//! - [`webhook_endpoints`] — Webhook endpoint management (feature: `client`)
//!
//! # Feature Flags
//!
//! - `client` (default) - The `reqwest`-based API client
//! - `telemetry` - Tracing spans and events for requests and verification

pub mod constants;
pub mod error;
pub mod headers;

#[cfg(feature = "client")]
pub mod cache;
#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "client")]
pub mod config;
#[cfg(feature = "client")]
pub mod webhook_endpoints;

pub use blindpay::verify as verify_webhook_signature;
pub use blindpay::{WebhookError, WebhookEvent, WebhookSecret, WebhookVerifier};
pub use headers::WebhookHeaders;

#[cfg(feature = "client")]
pub use client::BlindPayClient;
#[cfg(feature = "client")]
pub use config::ClientConfig;
