//! Client for the identity service.

use review_core::context::{CallContext, CallMetadata};
use review_core::error::RemoteError;
use review_core::services::{ClaimsResolver, UserClaims};

use crate::error::ClientError;
use crate::headers::propagated_headers;
use crate::response::parse_response;

/// Resolves the current caller's claims via `GET /api/v1/claims`.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    /// * `base_url` - e.g. `http://auth-service:8080`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the claims of the caller identified by `metadata`.
    pub async fn get_claims(&self, metadata: &CallMetadata) -> Result<UserClaims, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/v1/claims", self.base_url))
            .headers(propagated_headers(metadata)?)
            .send()
            .await?;

        parse_response(response).await
    }
}

impl ClaimsResolver for IdentityClient {
    async fn get_user_claims(&self, ctx: &CallContext) -> Result<UserClaims, RemoteError> {
        Ok(self.get_claims(ctx.metadata()).await?)
    }
}
