//! Client for the order service.

use review_core::context::{CallContext, CallMetadata};
use review_core::error::RemoteError;
use review_core::services::PurchaseVerifier;
use review_core::types::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::headers::propagated_headers;
use crate::response::parse_response;

#[derive(Debug, Serialize)]
struct CheckHandledRequest {
    product_id: ProductId,
}

#[derive(Debug, Deserialize)]
struct CheckHandledResponse {
    is_bought: bool,
}

/// Asks the order service whether the caller has a handled order for a product.
#[derive(Clone)]
pub struct OrderClient {
    client: reqwest::Client,
    base_url: String,
}

impl OrderClient {
    /// * `base_url` - e.g. `http://order-service:8080`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Sends `POST /api/v1/orders/check-handled` and returns `is_bought`.
    pub async fn check_handled(
        &self,
        metadata: &CallMetadata,
        product_id: ProductId,
    ) -> Result<bool, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/v1/orders/check-handled", self.base_url))
            .headers(propagated_headers(metadata)?)
            .json(&CheckHandledRequest { product_id })
            .send()
            .await?;

        let body: CheckHandledResponse = parse_response(response).await?;
        Ok(body.is_bought)
    }
}

impl PurchaseVerifier for OrderClient {
    async fn check_order_is_handled(
        &self,
        ctx: &CallContext,
        product_id: ProductId,
    ) -> Result<bool, RemoteError> {
        Ok(self.check_handled(ctx.metadata(), product_id).await?)
    }
}
