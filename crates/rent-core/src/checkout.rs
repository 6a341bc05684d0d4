//! # Checkout Workflow
//!
//! Client-side reservation state machine.
//!
//! ```text
//!   select()           submit()            order + widget open
//! Idle ──────▶ Editing ────────▶ Submitting ──────────────────▶ AwaitingPayment
//!   ▲            ▲  │ set_plan/     │ failure                      │     │
//!   │            │  │ update_form   ▼                              │     │
//!   │            │  └──────────  Editing ◀──── widget failure ─────┘     │
//!   └──────────────────────────── widget success / close() ──────────────┘
//! ```
//!
//! A widget failure keeps the widget's ticket: the customer may retry inside
//! the same widget, and a success from it still completes the reservation.
//!
//! The workflow never talks to the browser directly. It drives two injected
//! capabilities: an [`OrderClient`] for the order endpoint and a
//! [`PaymentWidgetLoader`] for the provider's hosted widget, so both can be
//! faked in tests.
//!
//! State sits behind `Rc<RefCell<_>>` and no borrow is held across an
//! `.await`, so a `close()` or `select()` may land while a submission is in
//! flight. Such a submission is then superseded and its result dropped.

use crate::listing::{EquipmentListing, RentalPlan};
use crate::order::{CreateOrderRequest, CreateOrderResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const BRAND_NAME: &str = "CiviRent Rentals";
pub const THEME_COLOR: &str = "#0f172a";

pub const MSG_MISSING_CONTACT: &str = "Fill in contact name, email, and phone to proceed.";
pub const MSG_INVALID_EMAIL: &str = "Enter a valid contact email address.";
pub const MSG_SCRIPT_LOAD_FAILED: &str = "Unable to load Razorpay checkout.";
pub const MSG_ORDER_FAILED: &str = "Unable to create payment order.";
pub const MSG_MISSING_KEY: &str =
    "Razorpay key is missing. Ensure environment variables are configured.";
pub const MSG_GENERIC_FAILURE: &str = "Something went wrong. Try again later.";
pub const MSG_PAYMENT_FAILED: &str = "Payment failed. Please try again.";
pub const MSG_PAYMENT_SUCCESS: &str =
    "Payment initiated successfully. Our operations team will reach out within 2 working hours.";

// =============================================================================
// Draft
// =============================================================================

/// Contact and project details collected before payment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub project_location: String,
    pub start_date: String,
    pub notes: String,
}

/// Addressable form field (for UI bindings)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    ContactName,
    ContactEmail,
    ContactPhone,
    ProjectLocation,
    StartDate,
    Notes,
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contactName" => Ok(FormField::ContactName),
            "contactEmail" => Ok(FormField::ContactEmail),
            "contactPhone" => Ok(FormField::ContactPhone),
            "projectLocation" => Ok(FormField::ProjectLocation),
            "startDate" => Ok(FormField::StartDate),
            "notes" => Ok(FormField::Notes),
            other => Err(format!("unknown form field: {}", other)),
        }
    }
}

impl ContactForm {
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::ContactName => &mut self.contact_name,
            FormField::ContactEmail => &mut self.contact_email,
            FormField::ContactPhone => &mut self.contact_phone,
            FormField::ProjectLocation => &mut self.project_location,
            FormField::StartDate => &mut self.start_date,
            FormField::Notes => &mut self.notes,
        };
        *slot = value.into();
    }

    /// Name, email and phone must be non-blank; the email must look like one.
    pub fn validate(&self) -> Result<(), &'static str> {
        let blank = |s: &str| s.trim().is_empty();
        if blank(&self.contact_name) || blank(&self.contact_email) || blank(&self.contact_phone) {
            return Err(MSG_MISSING_CONTACT);
        }
        if !looks_like_email(self.contact_email.trim()) {
            return Err(MSG_INVALID_EMAIL);
        }
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
}

/// The reservation being filled out for one listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    pub listing: EquipmentListing,
    pub plan: RentalPlan,
    pub form: ContactForm,
}

impl CheckoutDraft {
    pub fn new(listing: EquipmentListing) -> Self {
        Self {
            listing,
            plan: RentalPlan::default(),
            form: ContactForm::default(),
        }
    }

    /// Price of the selected plan, in rupees
    pub fn amount(&self) -> f64 {
        self.listing.price(self.plan)
    }

    /// Body sent to the order endpoint
    pub fn order_request(&self) -> CreateOrderRequest {
        let form = &self.form;
        CreateOrderRequest {
            amount: Some(self.amount()),
            plan: Some(self.plan.to_string()),
            equipment_id: Some(self.listing.id.clone()),
            equipment_name: Some(self.listing.name.clone()),
            contact_name: Some(form.contact_name.clone()),
            contact_email: Some(form.contact_email.clone()),
            contact_phone: Some(form.contact_phone.clone()),
            project_location: Some(form.project_location.clone()),
            start_date: Some(form.start_date.clone()),
            notes: Some(form.notes.clone()),
        }
    }
}

// =============================================================================
// Phases and feedback
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Editing,
    Submitting,
    AwaitingPayment,
}

/// Transient banner shown after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message", rename_all = "lowercase")]
pub enum Feedback {
    Success(String),
    Error(String),
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Feedback::Success(m) | Feedback::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Feedback::Error(_))
    }
}

/// What a call to [`CheckoutWorkflow::submit`] ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No draft, or a submission is already running
    Ignored,
    /// Form failed validation; nothing was sent
    Rejected,
    /// Script, order or widget failure; back to editing
    Failed,
    /// Draft was closed or replaced while the submission was in flight
    Superseded,
    /// Widget is open and waiting on the customer
    AwaitingPayment,
}

// =============================================================================
// Capabilities
// =============================================================================

/// Failure reported by an [`OrderClient`]
#[derive(Debug, Clone, Error)]
pub enum OrderClientError {
    /// Endpoint answered with a non-success status
    #[error("order endpoint returned {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode order response: {0}")]
    Decode(String),
}

impl OrderClientError {
    /// Server-supplied message when there is one, else a generic message
    pub fn user_message(&self) -> String {
        match self {
            OrderClientError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            OrderClientError::Rejected { .. } | OrderClientError::Decode(_) => {
                MSG_ORDER_FAILED.to_string()
            }
            OrderClientError::Transport(_) => MSG_GENERIC_FAILURE.to_string(),
        }
    }
}

/// Calls the order endpoint
#[async_trait(?Send)]
pub trait OrderClient {
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, OrderClientError>;
}

#[derive(Debug, Clone, Error)]
pub enum WidgetError {
    #[error("widget script failed to load: {0}")]
    ScriptLoad(String),

    #[error("widget unavailable: {0}")]
    Unavailable(String),

    #[error("widget failed to open: {0}")]
    Open(String),
}

/// Notes echoed to the provider dashboard for the payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetNotes {
    pub equipment_id: String,
    pub plan: String,
    pub project_location: String,
    pub start_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetTheme {
    pub color: String,
}

/// Options handed to the provider's widget constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetOptions {
    pub key: String,
    pub order_id: String,
    /// Exactly as returned by the order endpoint
    pub amount: i64,
    /// Exactly as returned by the order endpoint
    pub currency: String,
    pub name: String,
    pub description: String,
    pub notes: WidgetNotes,
    pub prefill: WidgetPrefill,
    pub theme: WidgetTheme,
}

impl WidgetOptions {
    pub fn new(draft: &CheckoutDraft, response: &CreateOrderResponse) -> Self {
        Self {
            key: response.key.clone(),
            order_id: response.order.id.clone(),
            amount: response.order.amount,
            currency: response.order.currency.clone(),
            name: BRAND_NAME.to_string(),
            description: format!("{} - {} plan", draft.listing.name, draft.plan),
            notes: WidgetNotes {
                equipment_id: draft.listing.id.clone(),
                plan: draft.plan.to_string(),
                project_location: draft.form.project_location.clone(),
                start_date: draft.form.start_date.clone(),
            },
            prefill: WidgetPrefill {
                name: draft.form.contact_name.clone(),
                email: draft.form.contact_email.clone(),
                contact: draft.form.contact_phone.clone(),
            },
            theme: WidgetTheme {
                color: THEME_COLOR.to_string(),
            },
        }
    }
}

/// Payload of the widget's success handler
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentSuccess {
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

/// Payload of the widget's `payment.failed` event
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentFailure {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Loads and opens the provider's hosted payment widget.
#[async_trait(?Send)]
pub trait PaymentWidgetLoader {
    /// Make the widget available. Must be idempotent: once loaded, later
    /// calls return without fetching anything.
    async fn load(&self) -> Result<(), WidgetError>;

    /// Open the widget. Outcomes are reported through `callbacks`.
    fn open(&self, options: &WidgetOptions, callbacks: PaymentCallbacks) -> Result<(), WidgetError>;
}

/// Success and failure handlers for one opened widget.
///
/// A failed attempt leaves the widget open for another try, so `fail` only
/// updates the banner. `succeed` and `dismiss` end the ticket; after that,
/// or once the draft has been closed, replaced or resubmitted, every event
/// is ignored.
#[derive(Debug, Clone)]
pub struct PaymentCallbacks {
    ticket: u64,
    state: Weak<RefCell<CheckoutState>>,
}

impl PaymentCallbacks {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Report a successful payment. Returns false if the event was dropped.
    pub fn succeed(&self, payment: PaymentSuccess) -> bool {
        self.settle(true, |state| {
            info!(
                payment_id = payment.razorpay_payment_id.as_deref().unwrap_or("unknown"),
                "Payment completed"
            );
            state.draft = None;
            state.phase = CheckoutPhase::Idle;
            state.generation += 1;
            state.feedback = Some(Feedback::Success(MSG_PAYMENT_SUCCESS.to_string()));
        })
    }

    /// Report a failed payment. Returns false if the event was dropped.
    pub fn fail(&self, failure: PaymentFailure) -> bool {
        self.settle(false, |state| {
            warn!(
                code = failure.code.as_deref().unwrap_or(""),
                reason = failure.reason.as_deref().unwrap_or(""),
                "Payment failed"
            );
            let message = failure
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| MSG_PAYMENT_FAILED.to_string());
            state.phase = CheckoutPhase::Editing;
            state.feedback = Some(Feedback::Error(message));
        })
    }

    /// Customer closed the widget without paying; back to editing, no banner.
    pub fn dismiss(&self) -> bool {
        self.settle(true, |state| {
            debug!("Payment widget dismissed");
            state.phase = CheckoutPhase::Editing;
        })
    }

    fn settle(&self, last: bool, apply: impl FnOnce(&mut CheckoutState)) -> bool {
        let Some(state) = self.state.upgrade() else {
            return false;
        };
        let mut state = state.borrow_mut();
        if state.ticket != Some(self.ticket) {
            debug!(ticket = self.ticket, "Widget event for stale ticket ignored");
            return false;
        }
        if last {
            state.ticket = None;
        }
        apply(&mut *state);
        true
    }
}

// =============================================================================
// Workflow
// =============================================================================

#[derive(Debug, Default)]
struct CheckoutState {
    phase: CheckoutPhase,
    draft: Option<CheckoutDraft>,
    feedback: Option<Feedback>,
    /// Bumped whenever the draft is opened, replaced or discarded
    generation: u64,
    /// Widget currently allowed to report an outcome
    ticket: Option<u64>,
    last_ticket: u64,
}

/// Read-only view of the workflow for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub phase: CheckoutPhase,
    pub draft: Option<CheckoutDraft>,
    pub feedback: Option<Feedback>,
    /// Submit control must be disabled while true
    pub busy: bool,
}

/// Single-reservation checkout driven by UI events
pub struct CheckoutWorkflow<C, W> {
    client: C,
    widget: W,
    state: Rc<RefCell<CheckoutState>>,
}

impl<C, W> CheckoutWorkflow<C, W>
where
    C: OrderClient,
    W: PaymentWidgetLoader,
{
    pub fn new(client: C, widget: W) -> Self {
        Self {
            client,
            widget,
            state: Rc::new(RefCell::new(CheckoutState::default())),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.state.borrow().phase
    }

    pub fn draft(&self) -> Option<CheckoutDraft> {
        self.state.borrow().draft.clone()
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.state.borrow().feedback.clone()
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase(),
            CheckoutPhase::Submitting | CheckoutPhase::AwaitingPayment
        )
    }

    pub fn snapshot(&self) -> CheckoutSnapshot {
        let state = self.state.borrow();
        CheckoutSnapshot {
            phase: state.phase,
            draft: state.draft.clone(),
            feedback: state.feedback.clone(),
            busy: matches!(
                state.phase,
                CheckoutPhase::Submitting | CheckoutPhase::AwaitingPayment
            ),
        }
    }

    /// Open a fresh draft for `listing`, replacing any previous one.
    pub fn select(&self, listing: EquipmentListing) {
        let mut state = self.state.borrow_mut();
        debug!(equipment_id = %listing.id, "Opening checkout draft");
        state.draft = Some(CheckoutDraft::new(listing));
        state.phase = CheckoutPhase::Editing;
        state.feedback = None;
        state.ticket = None;
        state.generation += 1;
    }

    /// Change the plan. Only allowed while editing.
    pub fn set_plan(&self, plan: RentalPlan) -> bool {
        self.edit(|draft| draft.plan = plan)
    }

    /// Change one form field. Only allowed while editing.
    pub fn set_field(&self, field: FormField, value: impl Into<String>) -> bool {
        let value = value.into();
        self.edit(|draft| draft.form.set(field, value))
    }

    /// Apply several form edits at once. Only allowed while editing.
    pub fn update_form(&self, update: impl FnOnce(&mut ContactForm)) -> bool {
        self.edit(|draft| update(&mut draft.form))
    }

    fn edit(&self, apply: impl FnOnce(&mut CheckoutDraft)) -> bool {
        let mut state = self.state.borrow_mut();
        if state.phase != CheckoutPhase::Editing {
            return false;
        }
        match state.draft.as_mut() {
            Some(draft) => {
                apply(draft);
                true
            }
            None => false,
        }
    }

    /// Discard the draft from any state.
    pub fn close(&self) {
        let mut state = self.state.borrow_mut();
        state.draft = None;
        state.phase = CheckoutPhase::Idle;
        state.feedback = None;
        state.ticket = None;
        state.generation += 1;
    }

    pub fn dismiss_feedback(&self) {
        self.state.borrow_mut().feedback = None;
    }

    /// Validate the draft, create an order and open the payment widget.
    pub async fn submit(&self) -> SubmitOutcome {
        let (generation, draft) = {
            let mut state = self.state.borrow_mut();
            if state.phase != CheckoutPhase::Editing {
                debug!(phase = ?state.phase, "Submit ignored");
                return SubmitOutcome::Ignored;
            }
            let validated = match state.draft.as_ref() {
                Some(draft) => draft.form.validate().map(|_| draft.clone()),
                None => return SubmitOutcome::Ignored,
            };
            match validated {
                Ok(draft) => {
                    state.phase = CheckoutPhase::Submitting;
                    state.feedback = None;
                    state.ticket = None;
                    (state.generation, draft)
                }
                Err(message) => {
                    state.feedback = Some(Feedback::Error(message.to_string()));
                    return SubmitOutcome::Rejected;
                }
            }
        };

        if let Err(err) = self.widget.load().await {
            warn!(error = %err, "Payment widget failed to load");
            return self.fail_submission(generation, MSG_SCRIPT_LOAD_FAILED.to_string());
        }
        if !self.is_submitting(generation) {
            return SubmitOutcome::Superseded;
        }

        let request = draft.order_request();
        let response = match self.client.create_order(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Order creation failed");
                return self.fail_submission(generation, err.user_message());
            }
        };

        if response.key.trim().is_empty() {
            return self.fail_submission(generation, MSG_MISSING_KEY.to_string());
        }

        let options = WidgetOptions::new(&draft, &response);
        let callbacks = {
            let mut state = self.state.borrow_mut();
            if state.generation != generation || state.phase != CheckoutPhase::Submitting {
                return SubmitOutcome::Superseded;
            }
            state.last_ticket += 1;
            let ticket = state.last_ticket;
            state.ticket = Some(ticket);
            state.phase = CheckoutPhase::AwaitingPayment;
            PaymentCallbacks {
                ticket,
                state: Rc::downgrade(&self.state),
            }
        };
        let ticket = callbacks.ticket;

        info!(
            order_id = %options.order_id,
            amount = options.amount,
            currency = %options.currency,
            "Opening payment widget"
        );

        if let Err(err) = self.widget.open(&options, callbacks) {
            warn!(error = %err, "Payment widget failed to open");
            let mut state = self.state.borrow_mut();
            if state.ticket == Some(ticket) && state.phase == CheckoutPhase::AwaitingPayment {
                state.ticket = None;
                state.phase = CheckoutPhase::Editing;
                state.feedback = Some(Feedback::Error(MSG_GENERIC_FAILURE.to_string()));
            }
            return SubmitOutcome::Failed;
        }

        SubmitOutcome::AwaitingPayment
    }

    fn is_submitting(&self, generation: u64) -> bool {
        let state = self.state.borrow();
        state.generation == generation && state.phase == CheckoutPhase::Submitting
    }

    fn fail_submission(&self, generation: u64, message: String) -> SubmitOutcome {
        let mut state = self.state.borrow_mut();
        if state.generation != generation || state.phase != CheckoutPhase::Submitting {
            return SubmitOutcome::Superseded;
        }
        state.phase = CheckoutPhase::Editing;
        state.feedback = Some(Feedback::Error(message));
        SubmitOutcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::tests::catalog;
    use crate::order::PaymentOrder;
    use std::cell::Cell;

    type Hook = Box<dyn Fn()>;

    struct FakeClient {
        response: Result<CreateOrderResponse, OrderClientError>,
        requests: RefCell<Vec<CreateOrderRequest>>,
        hook: RefCell<Option<Hook>>,
    }

    impl FakeClient {
        fn ok(amount: i64) -> Self {
            Self::with(Ok(CreateOrderResponse {
                key: "rzp_test_key".to_string(),
                order: PaymentOrder {
                    id: "order_Nx1".to_string(),
                    amount,
                    currency: "INR".to_string(),
                },
            }))
        }

        fn with(response: Result<CreateOrderResponse, OrderClientError>) -> Self {
            Self {
                response,
                requests: RefCell::new(Vec::new()),
                hook: RefCell::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    #[async_trait(?Send)]
    impl OrderClient for FakeClient {
        async fn create_order(
            &self,
            request: &CreateOrderRequest,
        ) -> Result<CreateOrderResponse, OrderClientError> {
            self.requests.borrow_mut().push(request.clone());
            if let Some(hook) = self.hook.borrow().as_ref() {
                hook();
            }
            self.response.clone()
        }
    }

    #[derive(Default)]
    struct FakeWidget {
        fail_load: bool,
        fail_open: bool,
        loads: Cell<u32>,
        opened: RefCell<Vec<WidgetOptions>>,
        callbacks: RefCell<Option<PaymentCallbacks>>,
    }

    impl FakeWidget {
        fn callbacks(&self) -> PaymentCallbacks {
            self.callbacks.borrow().clone().expect("widget was not opened")
        }
    }

    #[async_trait(?Send)]
    impl PaymentWidgetLoader for FakeWidget {
        async fn load(&self) -> Result<(), WidgetError> {
            self.loads.set(self.loads.get() + 1);
            if self.fail_load {
                return Err(WidgetError::ScriptLoad("404".into()));
            }
            Ok(())
        }

        fn open(
            &self,
            options: &WidgetOptions,
            callbacks: PaymentCallbacks,
        ) -> Result<(), WidgetError> {
            if self.fail_open {
                return Err(WidgetError::Open("constructor threw".into()));
            }
            self.opened.borrow_mut().push(options.clone());
            *self.callbacks.borrow_mut() = Some(callbacks);
            Ok(())
        }
    }

    fn listing(id: &str) -> EquipmentListing {
        catalog().get(id).cloned().unwrap()
    }

    fn fill_contact(workflow: &CheckoutWorkflow<FakeClient, FakeWidget>) {
        workflow.update_form(|form| {
            form.contact_name = "Asha Rao".into();
            form.contact_email = "asha@buildco.in".into();
            form.contact_phone = "+91 98765 43210".into();
            form.project_location = "Hyderabad ORR".into();
            form.start_date = "2026-11-02".into();
        });
    }

    fn workflow(client: FakeClient) -> CheckoutWorkflow<FakeClient, FakeWidget> {
        CheckoutWorkflow::new(client, FakeWidget::default())
    }

    #[test]
    fn test_select_opens_draft_with_weekly_plan() {
        let wf = workflow(FakeClient::ok(5400000));
        assert_eq!(wf.phase(), CheckoutPhase::Idle);

        wf.select(listing("eq-gnss-rover"));

        let draft = wf.draft().unwrap();
        assert_eq!(wf.phase(), CheckoutPhase::Editing);
        assert_eq!(draft.plan, RentalPlan::Weekly);
        assert_eq!(draft.form, ContactForm::default());
        assert_eq!(draft.amount(), 54000.0);
        assert!(wf.feedback().is_none());
    }

    #[test]
    fn test_selecting_another_listing_resets_draft() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        wf.set_plan(RentalPlan::Monthly);

        wf.select(listing("eq-soil-compactor"));

        let draft = wf.draft().unwrap();
        assert_eq!(draft.listing.id, "eq-soil-compactor");
        assert_eq!(draft.plan, RentalPlan::Weekly);
        assert_eq!(draft.form, ContactForm::default());
    }

    #[tokio::test]
    async fn test_missing_contact_field_blocks_submit() {
        for missing in [FormField::ContactName, FormField::ContactEmail, FormField::ContactPhone] {
            let wf = workflow(FakeClient::ok(5400000));
            wf.select(listing("eq-gnss-rover"));
            fill_contact(&wf);
            wf.set_field(missing, "   ");

            assert_eq!(wf.submit().await, SubmitOutcome::Rejected);
            assert_eq!(wf.client().calls(), 0);
            assert_eq!(wf.widget().loads.get(), 0);
            assert_eq!(wf.phase(), CheckoutPhase::Editing);
            assert_eq!(
                wf.feedback(),
                Some(Feedback::Error(MSG_MISSING_CONTACT.to_string()))
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_email_blocks_submit() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        wf.set_field(FormField::ContactEmail, "asha.buildco.in");

        assert_eq!(wf.submit().await, SubmitOutcome::Rejected);
        assert_eq!(wf.client().calls(), 0);
        assert_eq!(wf.feedback(), Some(Feedback::Error(MSG_INVALID_EMAIL.to_string())));
    }

    #[tokio::test]
    async fn test_gnss_rover_weekly_end_to_end() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);

        assert_eq!(wf.submit().await, SubmitOutcome::AwaitingPayment);
        assert_eq!(wf.phase(), CheckoutPhase::AwaitingPayment);
        assert!(wf.is_busy());

        let sent = wf.client().requests.borrow()[0].clone();
        assert_eq!(sent.amount, Some(54000.0));
        assert_eq!(sent.plan.as_deref(), Some("weekly"));
        assert_eq!(sent.equipment_id.as_deref(), Some("eq-gnss-rover"));
        assert_eq!(sent.contact_email.as_deref(), Some("asha@buildco.in"));

        let options = wf.widget().opened.borrow()[0].clone();
        assert_eq!(options.key, "rzp_test_key");
        assert_eq!(options.order_id, "order_Nx1");
        assert_eq!(options.amount, 5400000);
        assert_eq!(options.currency, "INR");
        assert_eq!(options.name, BRAND_NAME);
        assert_eq!(options.description, "Trimble R12i GNSS Rover - weekly plan");
        assert_eq!(options.prefill.contact, "+91 98765 43210");
        assert_eq!(options.notes.project_location, "Hyderabad ORR");
        assert_eq!(options.theme.color, THEME_COLOR);

        assert!(wf.widget().callbacks().succeed(PaymentSuccess::default()));

        assert_eq!(wf.phase(), CheckoutPhase::Idle);
        assert!(wf.draft().is_none());
        assert_eq!(
            wf.feedback(),
            Some(Feedback::Success(MSG_PAYMENT_SUCCESS.to_string()))
        );
    }

    #[tokio::test]
    async fn test_widget_uses_server_amount_verbatim() {
        let wf = workflow(FakeClient::ok(5400118));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);

        wf.submit().await;
        assert_eq!(wf.widget().opened.borrow()[0].amount, 5400118);
    }

    #[tokio::test]
    async fn test_payment_failure_keeps_draft_for_retry() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        wf.submit().await;

        let failed = wf.widget().callbacks().fail(PaymentFailure {
            code: Some("BAD_REQUEST_ERROR".into()),
            description: Some("Your card was declined".into()),
            reason: Some("payment_failed".into()),
        });
        assert!(failed);
        assert_eq!(wf.phase(), CheckoutPhase::Editing);
        assert!(wf.draft().is_some());
        assert_eq!(
            wf.feedback(),
            Some(Feedback::Error("Your card was declined".to_string()))
        );

        // retry goes through again with a fresh widget
        assert_eq!(wf.submit().await, SubmitOutcome::AwaitingPayment);
        assert_eq!(wf.client().calls(), 2);
        wf.widget().callbacks().fail(PaymentFailure::default());
        assert_eq!(
            wf.feedback(),
            Some(Feedback::Error(MSG_PAYMENT_FAILED.to_string()))
        );
    }

    #[tokio::test]
    async fn test_widget_events_resolve_once() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        wf.submit().await;

        let callbacks = wf.widget().callbacks();
        let twin = callbacks.clone();
        assert!(callbacks.succeed(PaymentSuccess::default()));
        assert!(!twin.fail(PaymentFailure::default()));
        assert!(!twin.succeed(PaymentSuccess::default()));
        assert!(!callbacks.dismiss());

        assert_eq!(wf.phase(), CheckoutPhase::Idle);
        assert_eq!(
            wf.feedback(),
            Some(Feedback::Success(MSG_PAYMENT_SUCCESS.to_string()))
        );
    }

    #[tokio::test]
    async fn test_success_after_failure_in_same_widget_completes() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        wf.submit().await;

        let callbacks = wf.widget().callbacks();
        assert!(callbacks.fail(PaymentFailure {
            description: Some("Card declined".into()),
            ..PaymentFailure::default()
        }));
        assert_eq!(wf.phase(), CheckoutPhase::Editing);
        assert_eq!(wf.feedback(), Some(Feedback::Error("Card declined".to_string())));

        // customer switches to UPI in the still-open widget
        assert!(callbacks.clone().succeed(PaymentSuccess::default()));

        assert_eq!(wf.phase(), CheckoutPhase::Idle);
        assert!(wf.draft().is_none());
        assert_eq!(
            wf.feedback(),
            Some(Feedback::Success(MSG_PAYMENT_SUCCESS.to_string()))
        );
        assert_eq!(wf.submit().await, SubmitOutcome::Ignored);
        assert_eq!(wf.client().calls(), 1);
    }

    #[tokio::test]
    async fn test_resubmit_retires_failed_widget() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        wf.submit().await;

        let first = wf.widget().callbacks();
        assert!(first.fail(PaymentFailure::default()));
        assert_eq!(wf.submit().await, SubmitOutcome::AwaitingPayment);

        assert!(!first.succeed(PaymentSuccess::default()));
        assert_eq!(wf.phase(), CheckoutPhase::AwaitingPayment);
        assert!(wf.widget().callbacks().succeed(PaymentSuccess::default()));
        assert!(wf.draft().is_none());
    }

    #[tokio::test]
    async fn test_dismissed_widget_allows_resubmit() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        wf.submit().await;

        let callbacks = wf.widget().callbacks();
        assert!(callbacks.dismiss());
        assert_eq!(wf.phase(), CheckoutPhase::Editing);
        assert!(wf.feedback().is_none());
        assert!(!callbacks.succeed(PaymentSuccess::default()));

        assert_eq!(wf.submit().await, SubmitOutcome::AwaitingPayment);
    }

    #[tokio::test]
    async fn test_widget_events_after_close_are_dropped() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        wf.submit().await;
        let callbacks = wf.widget().callbacks();

        wf.close();
        assert!(!callbacks.succeed(PaymentSuccess::default()));
        assert_eq!(wf.phase(), CheckoutPhase::Idle);
        assert!(wf.feedback().is_none());
    }

    #[tokio::test]
    async fn test_widget_events_after_reselect_are_dropped() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        wf.submit().await;
        let callbacks = wf.widget().callbacks();

        wf.select(listing("eq-excavator-320d"));
        assert!(!callbacks.fail(PaymentFailure::default()));
        assert_eq!(wf.draft().unwrap().listing.id, "eq-excavator-320d");
        assert!(wf.feedback().is_none());
    }

    #[tokio::test]
    async fn test_second_submit_is_ignored_while_busy() {
        let wf = workflow(FakeClient::ok(5400000));
        assert_eq!(wf.submit().await, SubmitOutcome::Ignored);

        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);
        assert_eq!(wf.submit().await, SubmitOutcome::AwaitingPayment);
        assert_eq!(wf.submit().await, SubmitOutcome::Ignored);
        assert_eq!(wf.client().calls(), 1);

        // edits are locked while the widget is open
        assert!(!wf.set_plan(RentalPlan::Daily));
    }

    #[tokio::test]
    async fn test_script_load_failure_returns_to_editing() {
        let wf = CheckoutWorkflow::new(
            FakeClient::ok(5400000),
            FakeWidget {
                fail_load: true,
                ..Default::default()
            },
        );
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);

        assert_eq!(wf.submit().await, SubmitOutcome::Failed);
        assert_eq!(wf.client().calls(), 0);
        assert_eq!(wf.phase(), CheckoutPhase::Editing);
        assert!(wf.draft().is_some());
        assert_eq!(
            wf.feedback(),
            Some(Feedback::Error(MSG_SCRIPT_LOAD_FAILED.to_string()))
        );
    }

    #[tokio::test]
    async fn test_order_failures_surface_best_message() {
        let cases = [
            (
                OrderClientError::Rejected {
                    status: 400,
                    message: Some("A valid amount is required.".into()),
                },
                "A valid amount is required.",
            ),
            (
                OrderClientError::Rejected {
                    status: 502,
                    message: None,
                },
                MSG_ORDER_FAILED,
            ),
            (
                OrderClientError::Transport("connection reset".into()),
                MSG_GENERIC_FAILURE,
            ),
        ];

        for (error, expected) in cases {
            let wf = workflow(FakeClient::with(Err(error)));
            wf.select(listing("eq-gnss-rover"));
            fill_contact(&wf);

            assert_eq!(wf.submit().await, SubmitOutcome::Failed);
            assert_eq!(wf.phase(), CheckoutPhase::Editing);
            assert!(wf.draft().is_some());
            assert_eq!(wf.feedback(), Some(Feedback::Error(expected.to_string())));
            assert!(wf.widget().opened.borrow().is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_key_blocks_widget() {
        let wf = workflow(FakeClient::with(Ok(CreateOrderResponse {
            key: String::new(),
            order: PaymentOrder {
                id: "order_Nx1".into(),
                amount: 5400000,
                currency: "INR".into(),
            },
        })));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);

        assert_eq!(wf.submit().await, SubmitOutcome::Failed);
        assert!(wf.widget().opened.borrow().is_empty());
        assert_eq!(wf.feedback(), Some(Feedback::Error(MSG_MISSING_KEY.to_string())));
    }

    #[tokio::test]
    async fn test_widget_open_failure_returns_to_editing() {
        let wf = CheckoutWorkflow::new(
            FakeClient::ok(5400000),
            FakeWidget {
                fail_open: true,
                ..Default::default()
            },
        );
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);

        assert_eq!(wf.submit().await, SubmitOutcome::Failed);
        assert_eq!(wf.phase(), CheckoutPhase::Editing);
        assert_eq!(
            wf.feedback(),
            Some(Feedback::Error(MSG_GENERIC_FAILURE.to_string()))
        );
    }

    #[tokio::test]
    async fn test_close_during_submit_supersedes_it() {
        let wf = Rc::new(workflow(FakeClient::ok(5400000)));
        let weak = Rc::downgrade(&wf);
        *wf.client().hook.borrow_mut() = Some(Box::new(move || {
            if let Some(wf) = weak.upgrade() {
                wf.close();
            }
        }));
        wf.select(listing("eq-gnss-rover"));
        fill_contact(&wf);

        assert_eq!(wf.submit().await, SubmitOutcome::Superseded);
        assert_eq!(wf.phase(), CheckoutPhase::Idle);
        assert!(wf.widget().opened.borrow().is_empty());
        assert!(wf.feedback().is_none());
    }

    #[test]
    fn test_close_clears_everything() {
        let wf = workflow(FakeClient::ok(5400000));
        wf.select(listing("eq-gnss-rover"));
        wf.close();

        let snapshot = wf.snapshot();
        assert_eq!(snapshot.phase, CheckoutPhase::Idle);
        assert!(snapshot.draft.is_none());
        assert!(snapshot.feedback.is_none());
        assert!(!snapshot.busy);
        assert!(!wf.set_plan(RentalPlan::Daily));
    }

    #[test]
    fn test_form_field_names() {
        assert_eq!("contactPhone".parse::<FormField>().unwrap(), FormField::ContactPhone);
        assert!("phone".parse::<FormField>().is_err());

        let feedback = serde_json::to_value(Feedback::Error("x".into())).unwrap();
        assert_eq!(feedback, serde_json::json!({"type": "error", "message": "x"}));
    }
}
