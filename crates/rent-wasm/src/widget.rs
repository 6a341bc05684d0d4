//! # Razorpay Widget
//!
//! Loads `checkout.js` once per page and drives the global `Razorpay`
//! constructor.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use rent_core::{
    PaymentCallbacks, PaymentFailure, PaymentSuccess, PaymentWidgetLoader, WidgetError,
    WidgetOptions,
};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlScriptElement;

pub const CHECKOUT_SCRIPT_URL: &str = "https://checkout.razorpay.com/v1/checkout.js";

const CONSTRUCTOR: &str = "Razorpay";

/// Browser-hosted Razorpay checkout
#[derive(Default)]
pub struct RazorpayWidget {
    loaded: Cell<bool>,
    /// In-flight script load, shared by concurrent callers
    pending: RefCell<Option<Promise>>,
    /// Handlers of the most recently opened widget. Replaced, and so freed,
    /// on the next `open`.
    handlers: RefCell<Option<WidgetHandlers>>,
}

struct WidgetHandlers {
    _success: Closure<dyn FnMut(JsValue)>,
    _dismiss: Closure<dyn FnMut()>,
    _failure: Closure<dyn FnMut(JsValue)>,
}

impl RazorpayWidget {
    pub fn new() -> Self {
        Self::default()
    }

    fn constructor() -> Option<Function> {
        let window = web_sys::window()?;
        Reflect::get(&window, &JsValue::from_str(CONSTRUCTOR))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    fn inject_script() -> Result<Promise, WidgetError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| WidgetError::Unavailable("no document".into()))?;
        let body = document
            .body()
            .ok_or_else(|| WidgetError::Unavailable("document has no body".into()))?;

        let script: HtmlScriptElement = document
            .create_element("script")
            .map_err(|e| WidgetError::ScriptLoad(describe(&e)))?
            .dyn_into()
            .map_err(|_| WidgetError::ScriptLoad("not a script element".into()))?;
        script.set_src(CHECKOUT_SCRIPT_URL);
        script.set_async(true);

        let promise = Promise::new(&mut |resolve, reject| {
            script.set_onload(Some(&resolve));
            script.set_onerror(Some(&reject));
        });

        body.append_child(&script)
            .map_err(|e| WidgetError::ScriptLoad(describe(&e)))?;
        Ok(promise)
    }
}

#[async_trait(?Send)]
impl PaymentWidgetLoader for RazorpayWidget {
    async fn load(&self) -> Result<(), WidgetError> {
        if self.loaded.get() || Self::constructor().is_some() {
            self.loaded.set(true);
            return Ok(());
        }

        let existing = self.pending.borrow().clone();
        let promise = match existing {
            Some(promise) => promise,
            None => {
                let promise = Self::inject_script()?;
                *self.pending.borrow_mut() = Some(promise.clone());
                promise
            }
        };

        match JsFuture::from(promise).await {
            Ok(_) => {
                self.loaded.set(true);
                self.pending.borrow_mut().take();
                Ok(())
            }
            Err(e) => {
                // next attempt injects a fresh script
                self.pending.borrow_mut().take();
                Err(WidgetError::ScriptLoad(describe(&e)))
            }
        }
    }

    fn open(&self, options: &WidgetOptions, callbacks: PaymentCallbacks) -> Result<(), WidgetError> {
        let constructor = Self::constructor()
            .ok_or_else(|| WidgetError::Unavailable(format!("window.{} is missing", CONSTRUCTOR)))?;

        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let js_options = options
            .serialize(&serializer)
            .map_err(|e| WidgetError::Open(e.to_string()))?;

        let on_success = callbacks.clone();
        let handler = Closure::<dyn FnMut(JsValue)>::new(move |response: JsValue| {
            let payment: PaymentSuccess =
                serde_wasm_bindgen::from_value(response).unwrap_or_default();
            on_success.succeed(payment);
        });
        set(&js_options, "handler", handler.as_ref())?;

        let on_dismiss = callbacks.clone();
        let ondismiss = Closure::<dyn FnMut()>::new(move || {
            on_dismiss.dismiss();
        });
        let modal = Object::new();
        set(&modal, "ondismiss", ondismiss.as_ref())?;
        set(&js_options, "modal", &modal)?;

        let instance = Reflect::construct(&constructor, &Array::of1(&js_options))
            .map_err(|e| WidgetError::Open(describe(&e)))?;

        let on_failure = callbacks;
        let failed = Closure::<dyn FnMut(JsValue)>::new(move |response: JsValue| {
            let error = Reflect::get(&response, &JsValue::from_str("error")).unwrap_or(JsValue::UNDEFINED);
            let failure: PaymentFailure = serde_wasm_bindgen::from_value(error).unwrap_or_default();
            on_failure.fail(failure);
        });

        method(&instance, "on")?
            .call2(&instance, &JsValue::from_str("payment.failed"), failed.as_ref())
            .map_err(|e| WidgetError::Open(describe(&e)))?;
        method(&instance, "open")?
            .call0(&instance)
            .map_err(|e| WidgetError::Open(describe(&e)))?;

        *self.handlers.borrow_mut() = Some(WidgetHandlers {
            _success: handler,
            _dismiss: ondismiss,
            _failure: failed,
        });
        Ok(())
    }
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), WidgetError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| WidgetError::Open(describe(&e)))
}

fn method(target: &JsValue, name: &str) -> Result<Function, WidgetError> {
    Reflect::get(target, &JsValue::from_str(name))
        .map_err(|e| WidgetError::Open(describe(&e)))?
        .dyn_into::<Function>()
        .map_err(|_| WidgetError::Open(format!("{}() is not a function", name)))
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
