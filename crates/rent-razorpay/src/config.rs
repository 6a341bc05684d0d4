//! # Razorpay Configuration
//!
//! Configuration management for the Razorpay integration.
//! All secrets are loaded from environment variables.

use rent_core::CheckoutError;
use std::env;
use std::fmt;

pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com";

pub const ENV_KEY_ID: &str = "RAZORPAY_KEY_ID";
pub const ENV_KEY_SECRET: &str = "RAZORPAY_KEY_SECRET";
pub const ENV_API_BASE_URL: &str = "RAZORPAY_API_BASE_URL";

/// Razorpay API configuration
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Public key id (rzp_test_... or rzp_live_...), also handed to the widget
    pub key_id: String,

    /// Secret paired with the key id. Never leaves the server.
    pub key_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl RazorpayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `RAZORPAY_KEY_ID`
    /// - `RAZORPAY_KEY_SECRET`
    ///
    /// Optional:
    /// - `RAZORPAY_API_BASE_URL`
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CheckoutError> {
        let required = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| CheckoutError::Configuration(format!("{} not set", name)))
        };

        let key_id = required(ENV_KEY_ID)?;
        let key_secret = required(ENV_KEY_SECRET)?;

        if !key_id.starts_with("rzp_test_") && !key_id.starts_with("rzp_live_") {
            return Err(CheckoutError::Configuration(format!(
                "{} must start with rzp_test_ or rzp_live_",
                ENV_KEY_ID
            )));
        }

        let mut config = Self::new(key_id, key_secret);
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_api_base_url(url.trim());
        }
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.key_id.starts_with("rzp_live_")
    }

    /// Full URL of the Orders API
    pub fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.api_base_url.trim_end_matches('/'))
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

// Secret stays out of logs.
impl fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}
