//! # Checkout Controller
//!
//! JavaScript-facing wrapper around the catalog and [`CheckoutWorkflow`].
//!
//! ```javascript
//! const checkout = new CheckoutController();
//! render(checkout.equipment("", "All"));
//!
//! checkout.select("eq-gnss-rover");
//! checkout.setField("contactName", "Asha Rao");
//! // ...
//! const outcome = await checkout.submit(); // "awaitingPayment", "rejected", ...
//! render(checkout.snapshot());
//! ```

use crate::client::HttpOrderClient;
use crate::widget::RazorpayWidget;
use rent_core::{
    CategoryFilter, CheckoutWorkflow, EquipmentCatalog, FormField, RentalPlan, SubmitOutcome,
};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

type BrowserWorkflow = CheckoutWorkflow<HttpOrderClient, RazorpayWidget>;

#[wasm_bindgen]
pub struct CheckoutController {
    catalog: EquipmentCatalog,
    workflow: Rc<BrowserWorkflow>,
}

#[wasm_bindgen]
impl CheckoutController {
    /// `api_base` defaults to the page's origin
    #[wasm_bindgen(constructor)]
    pub fn new(api_base: Option<String>) -> Result<CheckoutController, JsValue> {
        let api_base = match api_base {
            Some(base) => base,
            None => web_sys::window()
                .ok_or_else(|| JsValue::from_str("no window"))?
                .location()
                .origin()?,
        };

        let catalog = EquipmentCatalog::builtin().map_err(to_js)?;
        let client = HttpOrderClient::new(&api_base).map_err(to_js)?;

        Ok(Self {
            catalog,
            workflow: Rc::new(CheckoutWorkflow::new(client, RazorpayWidget::new())),
        })
    }

    /// Listings matching the search text and category label
    pub fn equipment(&self, query: &str, category: &str) -> Result<JsValue, JsValue> {
        let filter: CategoryFilter = category.parse().map_err(to_js)?;
        to_value(&self.catalog.filter(query, filter))
    }

    /// Category selector labels, "All" first
    pub fn categories(&self) -> Result<JsValue, JsValue> {
        let labels: Vec<_> = self.catalog.categories().iter().map(|c| c.label()).collect();
        to_value(&labels)
    }

    /// Open a fresh draft for a listing
    pub fn select(&self, equipment_id: &str) -> Result<(), JsValue> {
        let listing = self
            .catalog
            .get(equipment_id)
            .cloned()
            .ok_or_else(|| JsValue::from_str(&format!("Equipment not found: {}", equipment_id)))?;
        self.workflow.select(listing);
        Ok(())
    }

    #[wasm_bindgen(js_name = setPlan)]
    pub fn set_plan(&self, plan: &str) -> Result<bool, JsValue> {
        let plan: RentalPlan = plan.parse().map_err(to_js)?;
        Ok(self.workflow.set_plan(plan))
    }

    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&self, field: &str, value: String) -> Result<bool, JsValue> {
        let field: FormField = field.parse().map_err(|e: String| JsValue::from_str(&e))?;
        Ok(self.workflow.set_field(field, value))
    }

    /// Resolves with the outcome name once the widget is open or the attempt failed
    pub fn submit(&self) -> js_sys::Promise {
        let workflow = Rc::clone(&self.workflow);
        wasm_bindgen_futures::future_to_promise(async move {
            let outcome = workflow.submit().await;
            Ok(JsValue::from_str(outcome_name(outcome)))
        })
    }

    pub fn close(&self) {
        self.workflow.close();
    }

    #[wasm_bindgen(js_name = dismissFeedback)]
    pub fn dismiss_feedback(&self) {
        self.workflow.dismiss_feedback();
    }

    /// Phase, draft, banner and busy flag for rendering
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.workflow.snapshot())
    }

    /// Price of the open draft's plan, in rupees
    #[wasm_bindgen(js_name = payableAmount)]
    pub fn payable_amount(&self) -> Option<f64> {
        self.workflow.draft().map(|d| d.amount())
    }
}

fn outcome_name(outcome: SubmitOutcome) -> &'static str {
    match outcome {
        SubmitOutcome::Ignored => "ignored",
        SubmitOutcome::Rejected => "rejected",
        SubmitOutcome::Failed => "failed",
        SubmitOutcome::Superseded => "superseded",
        SubmitOutcome::AwaitingPayment => "awaitingPayment",
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(JsValue::from)
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
