//! # rent-wasm
//!
//! WebAssembly bindings for civirent-rs.
//!
//! This crate provides the browser side of checkout:
//! - `CheckoutController`, the catalog and reservation workflow for the page
//! - `RazorpayWidget`, which loads `checkout.js` once and opens the widget
//! - `HttpOrderClient`, which calls the order endpoint
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { CheckoutController } from 'civirent-wasm';
//!
//! await init();
//!
//! const checkout = new CheckoutController();
//! checkout.select('eq-gnss-rover');
//! console.log('Weekly:', checkout.payableAmount()); // 54000
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

pub mod client;
pub mod controller;
pub mod widget;

pub use client::HttpOrderClient;
pub use controller::CheckoutController;
pub use widget::RazorpayWidget;

use wasm_bindgen::prelude::*;

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
