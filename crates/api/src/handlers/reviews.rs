//! Handlers for the `/reviews` resource.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use review_core::review::{validate_submission, CreateReviewResponse, ReviewSubmission};
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;

use crate::error::{AppError, AppResult};
use crate::metadata::inbound_metadata;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/reviews
///
/// Verifies the purchase, resolves the caller, stores the review and relays
/// its images. Images that fail or are still pending at the submission
/// deadline are omitted from the response.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ReviewSubmission>,
) -> AppResult<(StatusCode, Json<DataResponse<CreateReviewResponse>>)> {
    validate_submission(&input)?;
    let metadata = inbound_metadata(&headers, &state.config.propagated_headers)?;

    let submitted_images = input.images.len();
    let coordinator = Arc::clone(&state.coordinator);
    let cancel = state.shutdown.child_token();
    let deadline = state.config.submission_deadline();

    // The submission outlives this handler: a dropped connection or an HTTP
    // timeout never abandons a review that is already stored.
    let submission = tokio::spawn(async move {
        let _deadline = cancel_after(cancel.clone(), deadline);
        coordinator.create_review(metadata, cancel, input).await
    });
    let response = submission
        .await
        .map_err(|e| AppError::Internal(format!("review submission task failed: {e}")))??;

    tracing::info!(
        review_id = response.review.id,
        product_id = response.review.product_id,
        submitted_images,
        stored_images = response.review.image_urls.len(),
        "Review submission accepted",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// Cancel `token` once `deadline` elapses, unless the handle is dropped first.
fn cancel_after(token: CancellationToken, deadline: Duration) -> AbortOnDropHandle<()> {
    AbortOnDropHandle::new(tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        tracing::warn!(?deadline, "Review submission deadline reached");
        token.cancel();
    }))
}
