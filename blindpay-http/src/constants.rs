//! HTTP-specific constants for the BlindPay API.

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.blindpay.com/v1";

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// `User-Agent` sent with every API request.
pub const USER_AGENT: &str = concat!("blindpay-rs/", env!("CARGO_PKG_VERSION"));

/// Webhook header carrying the message id.
pub const WEBHOOK_ID_HEADER: &str = "svix-id";

/// Webhook header carrying the send time, in Unix seconds.
pub const WEBHOOK_TIMESTAMP_HEADER: &str = "svix-timestamp";

/// Webhook header carrying one or more versioned signatures.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "svix-signature";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "BLINDPAY_API_KEY";

/// Environment variable holding the instance id.
pub const ENV_INSTANCE_ID: &str = "BLINDPAY_INSTANCE_ID";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const ENV_BASE_URL: &str = "BLINDPAY_BASE_URL";

/// Environment variable overriding [`DEFAULT_TIMEOUT_SECS`].
pub const ENV_TIMEOUT_SECS: &str = "BLINDPAY_TIMEOUT_SECS";
