//! # rent-api
//!
//! HTTP API layer for civirent-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The order endpoint backing the browser checkout
//! - Read-only catalog endpoints
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/payments/order` | Create Razorpay order |
//! | GET | `/api/equipment` | Filter listings (`q`, `category`) |
//! | GET | `/api/equipment/{id}` | Get listing |
//! | GET | `/api/categories` | Category options |
//! | GET | `/api/plans` | Rental plans |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
