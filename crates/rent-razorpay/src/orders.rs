//! # Razorpay Orders
//!
//! Implementation of the Razorpay Orders API.
//! An order must exist before the hosted checkout widget can be opened.

use crate::config::RazorpayConfig;
use async_trait::async_trait;
use reqwest::Client;
use rent_core::order::OrderNotes;
use rent_core::{CheckoutError, CheckoutResult, OrderDraft, OrderGateway, PaymentOrder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "razorpay";

/// Razorpay order gateway
///
/// Creates orders server-side with basic auth; the browser only ever sees
/// the public key id and the resulting order.
pub struct RazorpayOrderGateway {
    config: RazorpayConfig,
    client: Client,
}

impl RazorpayOrderGateway {
    /// Create a new gateway
    pub fn new(config: RazorpayConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CheckoutError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        if config.is_live_mode() {
            info!("Razorpay gateway running with live keys");
        }

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        Self::new(RazorpayConfig::from_env()?)
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }
}

#[async_trait]
impl OrderGateway for RazorpayOrderGateway {
    #[instrument(skip(self, draft), fields(receipt = %draft.receipt, amount = draft.amount))]
    async fn create_order(&self, draft: &OrderDraft) -> CheckoutResult<PaymentOrder> {
        let body = RazorpayOrderRequest {
            amount: draft.amount,
            currency: draft.currency.as_str(),
            receipt: &draft.receipt,
            notes: &draft.notes,
        };

        debug!("Creating Razorpay order");

        let response = self
            .client
            .post(self.config.orders_url())
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Razorpay API error: status={}, body={}", status, text);

            if let Ok(error_response) = serde_json::from_str::<RazorpayErrorResponse>(&text) {
                return Err(CheckoutError::Provider {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.summary(),
                });
            }

            return Err(CheckoutError::Provider {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, text),
            });
        }

        let order: RazorpayOrderResponse = serde_json::from_str(&text).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse Razorpay response: {}", e))
        })?;

        info!(
            "Created Razorpay order: id={}, amount={}, currency={}, status={}",
            order.id,
            order.amount,
            order.currency,
            order.status.as_deref().unwrap_or("unknown")
        );

        Ok(PaymentOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }

    fn public_key(&self) -> &str {
        &self.config.key_id
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Razorpay API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct RazorpayOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a OrderNotes,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrderResponse {
    id: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayError,
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    field: Option<String>,
}

impl RazorpayError {
    fn summary(&self) -> String {
        let mut out = format!(
            "{}: {}",
            self.code.as_deref().unwrap_or("UNKNOWN"),
            self.description.as_deref().unwrap_or("no description")
        );
        if let Some(field) = &self.field {
            out.push_str(&format!(" (field: {})", field));
        }
        out
    }
}
