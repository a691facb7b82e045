//! Liveness of the review service, mounted at the root rather than `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ReviewServiceHealth {
    /// `ok`, `degraded` (database unreachable) or `draining` (shutting down).
    pub status: &'static str,
    pub version: &'static str,
    pub database_reachable: bool,
    /// Whether new submissions still run to completion.
    pub accepting_reviews: bool,
    pub upstreams: UpstreamTargets,
}

/// Base URLs the write path calls.
#[derive(Serialize)]
pub struct UpstreamTargets {
    pub identity: String,
    pub order: String,
    pub image: String,
}

async fn review_service_health(State(state): State<AppState>) -> Json<ReviewServiceHealth> {
    let database_reachable = review_db::health_check(&state.pool).await.is_ok();
    let accepting_reviews = !state.shutdown.is_cancelled();

    let status = match (accepting_reviews, database_reachable) {
        (false, _) => "draining",
        (true, false) => "degraded",
        (true, true) => "ok",
    };

    let upstreams = &state.config.upstreams;
    Json(ReviewServiceHealth {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database_reachable,
        accepting_reviews,
        upstreams: UpstreamTargets {
            identity: upstreams.identity_url.clone(),
            order: upstreams.order_url.clone(),
            image: upstreams.image_url.clone(),
        },
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(review_service_health))
}
