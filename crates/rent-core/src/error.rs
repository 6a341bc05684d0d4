//! # Checkout Error Types
//!
//! Typed error handling for the civirent checkout engine.
//! Server-side operations return `Result<T, CheckoutError>`.

use thiserror::Error;

/// Message returned to callers when the payment credentials are missing.
pub const MSG_NOT_CONFIGURED: &str =
    "Razorpay credentials are not configured. Set RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET.";

/// Message returned when the request body does not match the order schema.
pub const MSG_INVALID_PAYLOAD: &str = "Invalid request payload.";

/// Message returned when the amount is missing, non-positive or not finite.
pub const MSG_INVALID_AMOUNT: &str = "A valid amount is required to create a Razorpay order.";

/// Message returned for any failure talking to the payment provider.
pub const MSG_UPSTREAM_UNAVAILABLE: &str =
    "We could not reach Razorpay to create an order. Please try again.";

/// Core error type for catalog and order operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request body did not match the expected schema
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Amount missing, zero, negative or not finite
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Equipment not found in catalog
    #[error("Equipment not found: {equipment_id}")]
    UnknownEquipment { equipment_id: String },

    /// Plan key outside daily/weekly/monthly
    #[error("Unknown rental plan: {plan}")]
    UnknownPlan { plan: String },

    /// Category outside the fixed enumeration
    #[error("Unknown category: {category}")]
    UnknownCategory { category: String },

    /// Payment provider rejected the call
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error communicating with provider (includes timeouts)
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckoutError {
    /// Returns true if the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Network(_) | CheckoutError::Provider { .. }
        )
    }

    /// True for failures caused by the payment provider or the link to it
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CheckoutError::Network(_)
                | CheckoutError::Provider { .. }
                | CheckoutError::Serialization(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Configuration(_) => 500,
            CheckoutError::InvalidRequest(_) => 400,
            CheckoutError::InvalidAmount { .. } => 400,
            CheckoutError::UnknownEquipment { .. } => 404,
            CheckoutError::UnknownPlan { .. } => 400,
            CheckoutError::UnknownCategory { .. } => 400,
            CheckoutError::Provider { .. } => 502,
            CheckoutError::Network(_) => 502,
            CheckoutError::Serialization(_) => 502,
            CheckoutError::Internal(_) => 500,
        }
    }

    /// Message safe to hand to an end user.
    ///
    /// Provider and configuration details stay in the server logs; only
    /// caller-controlled validation messages are echoed back.
    pub fn public_message(&self) -> String {
        match self {
            CheckoutError::Configuration(_) => MSG_NOT_CONFIGURED.to_string(),
            CheckoutError::InvalidRequest(_) => MSG_INVALID_PAYLOAD.to_string(),
            CheckoutError::InvalidAmount { .. } => MSG_INVALID_AMOUNT.to_string(),
            CheckoutError::UnknownEquipment { equipment_id } => {
                format!("Equipment not found: {}", equipment_id)
            }
            CheckoutError::UnknownPlan { plan } => format!("Unknown rental plan: {}", plan),
            CheckoutError::UnknownCategory { category } => {
                format!("Unknown category: {}", category)
            }
            CheckoutError::Provider { .. }
            | CheckoutError::Network(_)
            | CheckoutError::Serialization(_) => MSG_UPSTREAM_UNAVAILABLE.to_string(),
            CheckoutError::Internal(_) => "Something went wrong. Try again later.".to_string(),
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
