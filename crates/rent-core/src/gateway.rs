//! # Order Gateway Trait
//!
//! Seam between the order endpoint and the payment provider.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   OrderGateway (trait)                      │
//! │  ├── create_order()                                         │
//! │  ├── public_key()                                           │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!                  │ RazorpayOrder     │
//!                  │   Gateway         │
//!                  └───────────────────┘
//! ```

use crate::error::CheckoutResult;
use crate::order::{OrderDraft, PaymentOrder};
use async_trait::async_trait;
use std::sync::Arc;

/// A payment provider able to create orders for the hosted widget.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create an order with the provider.
    ///
    /// The returned order carries the id, amount and currency exactly as
    /// the provider recorded them.
    async fn create_order(&self, draft: &OrderDraft) -> CheckoutResult<PaymentOrder>;

    /// Public key id the browser widget must be opened with.
    fn public_key(&self) -> &str;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedOrderGateway = Arc<dyn OrderGateway>;
