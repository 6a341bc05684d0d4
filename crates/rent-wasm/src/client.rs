//! # Order Client
//!
//! `OrderClient` over HTTP. Uses the browser's fetch on wasm32.

use async_trait::async_trait;
use rent_core::{CreateOrderRequest, CreateOrderResponse, ErrorBody, OrderClient, OrderClientError};

pub const ORDER_PATH: &str = "/api/payments/order";

/// Calls `POST /api/payments/order` on the storefront API
pub struct HttpOrderClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOrderClient {
    /// `api_base` is an origin such as `https://rent.civirent.in`
    pub fn new(api_base: &str) -> Result<Self, OrderClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| OrderClientError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", api_base.trim_end_matches('/'), ORDER_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl OrderClient for HttpOrderClient {
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, OrderClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| OrderClientError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OrderClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(OrderClientError::Rejected {
                status: status.as_u16(),
                message: serde_json::from_str::<ErrorBody>(&text)
                    .ok()
                    .map(|body| body.message),
            });
        }

        serde_json::from_str(&text).map_err(|e| OrderClientError::Decode(e.to_string()))
    }
}
