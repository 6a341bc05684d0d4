//! # Request Handlers
//!
//! Axum request handlers for the rental API.
//! Every error body is `{"message": ...}` built from [`CheckoutError::public_message`].

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rent_core::{
    CategoryFilter, CheckoutError, CreateOrderRequest, CreateOrderResponse, ErrorBody,
    OrderDraft, RentalPlan,
};
use rent_core::error::MSG_NOT_CONFIGURED;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query string of `GET /api/equipment`
#[derive(Debug, Default, Deserialize)]
pub struct EquipmentQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Entry of `GET /api/plans`
#[derive(Debug, Serialize)]
pub struct PlanInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

fn checkout_error_to_response(err: CheckoutError) -> ApiError {
    let code = err.status_code();
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorBody::new(err.public_message())),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "civirent",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a Razorpay order for the browser widget.
///
/// Takes the raw body so the credential check runs before any parsing.
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn create_payment_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let gateway = state.gateway.as_ref().ok_or_else(|| {
        error!("Order requested but Razorpay credentials are missing");
        checkout_error_to_response(CheckoutError::Configuration(MSG_NOT_CONFIGURED.to_string()))
    })?;

    let request = CreateOrderRequest::from_slice(&body).map_err(|e| {
        warn!("Rejected order payload: {}", e);
        checkout_error_to_response(e)
    })?;

    let draft = OrderDraft::from_request(&request, state.currency).map_err(|e| {
        warn!("Rejected order amount: {}", e);
        checkout_error_to_response(e)
    })?;

    info!(
        "Creating order: equipment={}, plan={}, amount={} {}, receipt={}",
        draft.notes.equipment_id,
        draft.notes.plan,
        draft.amount,
        draft.currency,
        draft.receipt
    );

    let order = gateway.create_order(&draft).await.map_err(|e| {
        error!("Failed to create order via {}: {}", gateway.provider_name(), e);
        checkout_error_to_response(e)
    })?;

    info!("Created order: {}", order.id);

    Ok(Json(CreateOrderResponse {
        key: gateway.public_key().to_string(),
        order,
    }))
}

/// Filter the catalog by text and category
pub async fn list_equipment(
    State(state): State<AppState>,
    Query(query): Query<EquipmentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category: CategoryFilter = query
        .category
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(checkout_error_to_response)?;

    let equipment = state
        .catalog
        .filter(query.q.as_deref().unwrap_or_default(), category);
    Ok(Json(serde_json::json!({
        "equipment": equipment,
        "count": equipment.len()
    })))
}

/// Get single listing
pub async fn get_equipment(
    State(state): State<AppState>,
    Path(equipment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = state.catalog.get(&equipment_id).ok_or_else(|| {
        checkout_error_to_response(CheckoutError::UnknownEquipment {
            equipment_id: equipment_id.clone(),
        })
    })?;

    Ok(Json(listing.clone()))
}

/// Category selector options, "All" first
pub async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    let categories: Vec<_> = state
        .catalog
        .categories()
        .iter()
        .map(|c| c.label())
        .collect();
    Json(serde_json::json!({ "categories": categories }))
}

/// Rental plans in display order
pub async fn list_plans() -> impl IntoResponse {
    let plans: Vec<_> = RentalPlan::ALL
        .iter()
        .map(|plan| PlanInfo {
            key: plan.as_str(),
            label: plan.label(),
            description: plan.description(),
        })
        .collect();
    Json(serde_json::json!({ "plans": plans }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rent_core::error::{MSG_INVALID_AMOUNT, MSG_UPSTREAM_UNAVAILABLE};

    #[test]
    fn test_error_response() {
        let (status, Json(body)) =
            checkout_error_to_response(CheckoutError::InvalidRequest("trailing comma".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Invalid request payload.");
    }

    #[test]
    fn test_checkout_error_conversion() {
        let (status, Json(body)) = checkout_error_to_response(CheckoutError::InvalidAmount {
            message: "amount must be positive, got -5".into(),
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, MSG_INVALID_AMOUNT);

        let (status, Json(body)) = checkout_error_to_response(CheckoutError::Network(
            "error sending request for url (https://api.razorpay.com/v1/orders)".into(),
        ));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.message, MSG_UPSTREAM_UNAVAILABLE);
    }
}
