//! # Order Types
//!
//! Wire schema shared by the browser checkout and the order endpoint, plus
//! the provider-facing order built from a validated request.

use crate::error::{CheckoutError, CheckoutResult};
use crate::listing::{Currency, RentalPlan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Razorpay rejects receipts longer than this
pub const MAX_RECEIPT_LEN: usize = 40;

const RECEIPT_PREFIX: &str = "civirent";

/// Body of `POST /api/payments/order`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    /// Amount in rupees (major units)
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    /// Parse a raw body against the schema
    pub fn from_slice(body: &[u8]) -> CheckoutResult<Self> {
        serde_json::from_slice(body).map_err(|e| CheckoutError::InvalidRequest(e.to_string()))
    }

    /// The amount converted to paise, if it is a positive finite number that
    /// survives the conversion as at least one minor unit.
    pub fn amount_minor(&self, currency: Currency) -> CheckoutResult<i64> {
        let amount = self.amount.ok_or_else(|| CheckoutError::InvalidAmount {
            message: "amount is missing".to_string(),
        })?;

        if !amount.is_finite() || amount <= 0.0 {
            return Err(CheckoutError::InvalidAmount {
                message: format!("amount must be positive, got {}", amount),
            });
        }

        let minor = currency.to_smallest_unit(amount).ok_or_else(|| {
            CheckoutError::InvalidAmount {
                message: format!("amount {} is out of range", amount),
            }
        })?;
        if minor < 1 {
            return Err(CheckoutError::InvalidAmount {
                message: format!("amount {} rounds to zero {}", amount, currency),
            });
        }
        Ok(minor)
    }
}

/// Descriptive metadata attached to the provider order.
///
/// Every key is always present (empty when the caller left it out) so
/// downstream reconciliation sees a stable shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub plan: String,
    pub equipment_id: String,
    pub equipment_name: String,
    pub project_location: String,
    pub start_date: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub additional_notes: String,
}

impl OrderNotes {
    pub fn from_request(request: &CreateOrderRequest) -> Self {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            plan: request
                .plan
                .clone()
                .unwrap_or_else(|| RentalPlan::default().to_string()),
            equipment_id: field(&request.equipment_id),
            equipment_name: field(&request.equipment_name),
            project_location: field(&request.project_location),
            start_date: field(&request.start_date),
            contact_name: field(&request.contact_name),
            contact_email: field(&request.contact_email),
            contact_phone: field(&request.contact_phone),
            additional_notes: field(&request.notes),
        }
    }
}

/// An order to be created with the payment provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDraft {
    /// Amount in smallest currency unit (paise)
    pub amount: i64,
    pub currency: Currency,
    /// Merchant reference, best-effort unique per request
    pub receipt: String,
    pub notes: OrderNotes,
}

impl OrderDraft {
    /// Validate a request and build the provider order for it
    pub fn from_request(request: &CreateOrderRequest, currency: Currency) -> CheckoutResult<Self> {
        let amount = request.amount_minor(currency)?;
        let nonce = Uuid::new_v4().simple().to_string();
        Ok(Self {
            amount,
            currency,
            receipt: build_receipt(request.equipment_id.as_deref(), Utc::now(), &nonce),
            notes: OrderNotes::from_request(request),
        })
    }
}

/// `civirent_<equipment>_<unix millis>_<6 chars of nonce>`, with the
/// equipment segment shortened to fit [`MAX_RECEIPT_LEN`].
pub fn build_receipt(equipment_id: Option<&str>, at: DateTime<Utc>, nonce: &str) -> String {
    let equipment = equipment_id.filter(|id| !id.is_empty()).unwrap_or("order");
    let nonce: String = nonce.chars().take(6).collect();
    let tail = format!("_{}_{}", at.timestamp_millis(), nonce);

    let budget = MAX_RECEIPT_LEN.saturating_sub(RECEIPT_PREFIX.len() + 1 + tail.len());
    let mut end = budget.min(equipment.len());
    while !equipment.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}_{}{}", RECEIPT_PREFIX, &equipment[..end], tail)
}

/// A provider-side order as handed to the browser widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Provider's opaque order id
    pub id: String,
    /// Amount in smallest currency unit, as the provider recorded it
    pub amount: i64,
    /// Currency code, as the provider recorded it
    pub currency: String,
}

/// Success body of `POST /api/payments/order`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    /// Public key id the widget is opened with
    pub key: String,
    pub order: PaymentOrder,
}

/// Error body returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
