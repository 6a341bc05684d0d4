//! # rent-core
//!
//! Core types and traits for the civirent equipment rental storefront.
//!
//! This crate provides:
//! - `EquipmentListing` and `EquipmentCatalog` for the rental fleet
//! - `CreateOrderRequest`, `OrderDraft` and `PaymentOrder` for the order endpoint
//! - `OrderGateway` trait for implementing payment providers
//! - `CheckoutWorkflow`, the browser-side reservation state machine
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use rent_core::{CreateOrderRequest, Currency, EquipmentCatalog, OrderDraft, RentalPlan};
//!
//! let catalog = EquipmentCatalog::builtin()?;
//! let rover = catalog.get("eq-gnss-rover").unwrap();
//!
//! let request = CreateOrderRequest {
//!     amount: Some(rover.price(RentalPlan::Weekly)),
//!     equipment_id: Some(rover.id.clone()),
//!     ..Default::default()
//! };
//!
//! // 54000 rupees -> 5400000 paise
//! let draft = OrderDraft::from_request(&request, Currency::Inr)?;
//! let order = gateway.create_order(&draft).await?;
//! ```

pub mod checkout;
pub mod error;
pub mod gateway;
pub mod listing;
pub mod order;

// Re-exports for convenience
pub use checkout::{
    CheckoutDraft, CheckoutPhase, CheckoutSnapshot, CheckoutWorkflow, ContactForm, Feedback,
    FormField, OrderClient, OrderClientError, PaymentCallbacks, PaymentFailure, PaymentSuccess,
    PaymentWidgetLoader, SubmitOutcome, WidgetError, WidgetOptions,
};
pub use error::{CheckoutError, CheckoutResult};
pub use gateway::{BoxedOrderGateway, OrderGateway};
pub use listing::{
    Availability, Category, CategoryFilter, Currency, EquipmentCatalog, EquipmentListing,
    Pricing, RentalPlan, SpecPair,
};
pub use order::{
    CreateOrderRequest, CreateOrderResponse, ErrorBody, OrderDraft, OrderNotes, PaymentOrder,
};
