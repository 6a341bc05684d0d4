//! Browser tests: `wasm-pack test --headless --chrome`

#![cfg(target_arch = "wasm32")]

use rent_wasm::CheckoutController;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn controller() -> CheckoutController {
    CheckoutController::new(Some("http://localhost:8080".to_string())).unwrap()
}

#[wasm_bindgen_test]
fn selecting_a_listing_opens_a_weekly_draft() {
    let checkout = controller();
    checkout.select("eq-gnss-rover").unwrap();

    assert_eq!(checkout.payable_amount(), Some(54000.0));
    assert!(checkout.set_plan("monthly").unwrap());
    assert_ne!(checkout.payable_amount(), Some(54000.0));
    assert!(checkout.set_field("contactName", "Asha Rao".into()).unwrap());
    assert!(checkout.set_field("phone", "1".into()).is_err());
}

#[wasm_bindgen_test]
fn unknown_listing_and_category_are_errors() {
    let checkout = controller();
    assert!(checkout.select("eq-tower-crane").is_err());
    assert!(checkout.equipment("", "Cranes").is_err());
    assert!(checkout.equipment("trimble", "All").unwrap() != JsValue::NULL);
}

#[wasm_bindgen_test]
async fn submit_with_blank_contact_is_rejected_locally() {
    let checkout = controller();
    checkout.select("eq-gnss-rover").unwrap();

    let outcome = wasm_bindgen_futures::JsFuture::from(checkout.submit())
        .await
        .unwrap();
    assert_eq!(outcome.as_string().as_deref(), Some("rejected"));
}
