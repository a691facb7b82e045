//! The review write path.
//!
//! [`ReviewWriteCoordinator`] runs one submission through a linear state
//! machine with early-abort branches:
//!
//! ```text
//! Start -> ExtractIdentity -> VerifyPurchase -> ResolveIdentity -> PersistReview
//!       -> RelayImages (0..N, independent) -> AssembleResponse -> Done
//! ```
//!
//! A failure in any of the first four steps ends the submission with a
//! [`SubmissionError`]. Image relay is best-effort: a failed image is logged
//! and left out of the response, and never fails the submission.

use futures::future;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::context::{CallContext, CallMetadata};
use crate::error::{ImageRelayError, SubmissionError};
use crate::image_relay::ImageRelay;
use crate::review::{CreateReviewResponse, CreatedReview, ReviewSubmission, REVIEW_CREATED_MESSAGE};
use crate::services::{
    ClaimsResolver, ImageUploader, NewReview, PurchaseVerifier, ReviewStore, UserClaims,
};
use crate::types::{DbId, ProductId, UserId};

/// Default number of images relayed concurrently for one submission.
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 4;

/// Steps of the submission state machine, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStep {
    ExtractIdentity,
    VerifyPurchase,
    ResolveIdentity,
    PersistReview,
    RelayImages,
    AssembleResponse,
}

impl SubmissionStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExtractIdentity => "extract_identity",
            Self::VerifyPurchase => "verify_purchase",
            Self::ResolveIdentity => "resolve_identity",
            Self::PersistReview => "persist_review",
            Self::RelayImages => "relay_images",
            Self::AssembleResponse => "assemble_response",
        }
    }
}

/// Sequences the collaborators of one review submission.
///
/// Holds only read-only handles, so a single instance serves every request.
pub struct ReviewWriteCoordinator<V, C, U, S> {
    verifier: V,
    claims: C,
    relay: ImageRelay<U>,
    store: S,
    image_concurrency: usize,
}

impl<V, C, U, S> ReviewWriteCoordinator<V, C, U, S>
where
    V: PurchaseVerifier,
    C: ClaimsResolver,
    U: ImageUploader,
    S: ReviewStore,
{
    pub fn new(verifier: V, claims: C, uploader: U, store: S) -> Self {
        Self {
            verifier,
            claims,
            relay: ImageRelay::new(uploader),
            store,
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
        }
    }

    /// Set how many images of one submission are relayed at once (min 1).
    pub fn with_image_concurrency(mut self, image_concurrency: usize) -> Self {
        self.image_concurrency = image_concurrency.max(1);
        self
    }

    /// Set the decoded size limit for a single image.
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.relay = self.relay.with_max_image_bytes(max_image_bytes);
        self
    }

    /// Create a review on behalf of the caller described by `inbound`.
    ///
    /// `cancel` aborts pending remote calls. Cancelled gating steps fail with
    /// [`SubmissionError::Cancelled`]; images in flight at cancellation are
    /// counted as failed.
    pub async fn create_review(
        &self,
        inbound: CallMetadata,
        cancel: CancellationToken,
        submission: ReviewSubmission,
    ) -> Result<CreateReviewResponse, SubmissionError> {
        let product_id = submission.product_id;

        trace_step(SubmissionStep::ExtractIdentity, product_id);
        let ctx = CallContext::from_inbound(inbound, cancel)
            .inspect_err(|e| log_failure(SubmissionStep::ExtractIdentity, product_id, e))?;

        trace_step(SubmissionStep::VerifyPurchase, product_id);
        self.verify_purchase(&ctx, product_id)
            .await
            .inspect_err(|e| log_failure(SubmissionStep::VerifyPurchase, product_id, e))?;

        trace_step(SubmissionStep::ResolveIdentity, product_id);
        let user_id = self
            .resolve_identity(&ctx)
            .await
            .inspect_err(|e| log_failure(SubmissionStep::ResolveIdentity, product_id, e))?;

        trace_step(SubmissionStep::PersistReview, product_id);
        let new_review = NewReview {
            user_id,
            product_id,
            num_star: submission.num_star,
            content: submission.content,
        };
        let review_id = self
            .persist_review(&ctx, &new_review)
            .await
            .inspect_err(|e| log_failure(SubmissionStep::PersistReview, product_id, e))?;

        trace_step(SubmissionStep::RelayImages, product_id);
        let images_submitted = submission.images.len();
        let image_urls = self
            .relay_images(&ctx, review_id, submission.images)
            .await;

        trace_step(SubmissionStep::AssembleResponse, product_id);
        tracing::info!(
            review_id,
            user_id,
            product_id,
            images_submitted,
            images_stored = image_urls.len(),
            "Review created"
        );

        Ok(assemble_response(review_id, new_review, image_urls))
    }

    async fn verify_purchase(
        &self,
        ctx: &CallContext,
        product_id: ProductId,
    ) -> Result<(), SubmissionError> {
        let is_bought = ctx
            .run_until_cancelled(self.verifier.check_order_is_handled(ctx, product_id))
            .await
            .ok_or(SubmissionError::Cancelled)?
            .map_err(SubmissionError::OrderVerificationFailed)?;

        if !is_bought {
            return Err(SubmissionError::PurchaseNotVerified);
        }
        Ok(())
    }

    async fn resolve_identity(&self, ctx: &CallContext) -> Result<UserId, SubmissionError> {
        let claims = ctx
            .run_until_cancelled(self.claims.get_user_claims(ctx))
            .await
            .ok_or(SubmissionError::Cancelled)?
            .map_err(|e| SubmissionError::IdentityResolutionFailed(e.to_string()))?;

        parse_user_id(&claims)
    }

    async fn persist_review(
        &self,
        ctx: &CallContext,
        review: &NewReview,
    ) -> Result<DbId, SubmissionError> {
        if ctx.is_cancelled() {
            return Err(SubmissionError::Cancelled);
        }
        // Not raced against cancellation: an insert abandoned mid-flight may
        // still commit, and the caller would see an error for a stored review.
        self.store
            .insert_review(review)
            .await
            .map_err(SubmissionError::PersistenceFailed)
    }

    /// Relay every image with bounded concurrency, keeping submission order
    /// among the successes.
    async fn relay_images(
        &self,
        ctx: &CallContext,
        review_id: DbId,
        images: Vec<String>,
    ) -> Vec<String> {
        // Futures are built up front over owned payloads so the stream holds
        // no closure borrowing per-item data.
        let relays: Vec<_> = images
            .into_iter()
            .enumerate()
            .map(|(index, payload)| self.relay_one(ctx, review_id, index, payload))
            .collect();

        stream::iter(relays)
            .buffered(self.image_concurrency)
            .filter_map(future::ready)
            .collect()
            .await
    }

    async fn relay_one(
        &self,
        ctx: &CallContext,
        review_id: DbId,
        index: usize,
        payload: String,
    ) -> Option<String> {
        self.relay_and_store(ctx, review_id, index, &payload)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    review_id,
                    image_index = index,
                    error = %e,
                    "Skipping image that could not be relayed"
                );
            })
            .ok()
    }

    async fn relay_and_store(
        &self,
        ctx: &CallContext,
        review_id: DbId,
        index: usize,
        payload: &str,
    ) -> Result<String, ImageRelayError> {
        let image_url = self.relay.relay(ctx, payload).await?;

        let position = i32::try_from(index).unwrap_or(i32::MAX);
        // Runs to completion once the image is stored remotely, so that every
        // stored row is reported in the response.
        self.store
            .insert_image(review_id, &image_url, position)
            .await
            .map_err(ImageRelayError::Persistence)?;

        Ok(image_url)
    }
}

/// Extract the numeric user id from identity claims.
///
/// A malformed or non-positive id fails the submission instead of being
/// stored under a placeholder user.
pub fn parse_user_id(claims: &UserClaims) -> Result<UserId, SubmissionError> {
    match claims.id.trim().parse::<UserId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(SubmissionError::IdentityResolutionFailed(format!(
            "malformed user id {:?} in claims",
            claims.id
        ))),
    }
}

/// Build the outward result from persisted state and the stored image URLs.
pub fn assemble_response(
    review_id: DbId,
    review: NewReview,
    image_urls: Vec<String>,
) -> CreateReviewResponse {
    CreateReviewResponse {
        message: REVIEW_CREATED_MESSAGE.to_string(),
        review: CreatedReview {
            id: review_id,
            user_id: review.user_id,
            product_id: review.product_id,
            image_urls,
            num_star: review.num_star,
            content: review.content,
        },
    }
}

fn trace_step(step: SubmissionStep, product_id: ProductId) {
    tracing::debug!(step = step.as_str(), product_id, "Review submission step");
}

fn log_failure(step: SubmissionStep, product_id: ProductId, error: &SubmissionError) {
    tracing::warn!(
        step = step.as_str(),
        product_id,
        error = %error,
        "Review submission failed"
    );
}
