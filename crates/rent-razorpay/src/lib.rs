//! # rent-razorpay
//!
//! Razorpay order gateway for civirent-rs.
//!
//! Implements [`rent_core::OrderGateway`] on top of the Razorpay Orders API.
//! The order it returns is what the browser hands to Razorpay's hosted
//! checkout widget.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rent_razorpay::RazorpayOrderGateway;
//! use rent_core::{Currency, OrderDraft, OrderGateway};
//!
//! // Reads RAZORPAY_KEY_ID / RAZORPAY_KEY_SECRET
//! let gateway = RazorpayOrderGateway::from_env()?;
//!
//! let draft = OrderDraft::from_request(&request, Currency::Inr)?;
//! let order = gateway.create_order(&draft).await?;
//!
//! // Respond with { key: gateway.public_key(), order }
//! ```

pub mod config;
pub mod orders;

// Re-exports
pub use config::RazorpayConfig;
pub use orders::RazorpayOrderGateway;
