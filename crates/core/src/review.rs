//! Review submission input, rating bounds and validation functions.
//!
//! The API layer runs [`validate_submission`] before handing a submission to
//! the coordinator so malformed input never reaches a remote service.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, ProductId, UserId};

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Lowest accepted star rating.
pub const MIN_NUM_STAR: i32 = 1;

/// Highest accepted star rating.
pub const MAX_NUM_STAR: i32 = 5;

/// Maximum length for a review's text content, in characters.
pub const MAX_CONTENT_LENGTH: usize = 5_000;

/// Maximum number of images attached to a single submission.
pub const MAX_IMAGES_PER_REVIEW: usize = 10;

/// Message returned with every successfully created review.
pub const REVIEW_CREATED_MESSAGE: &str = "Review created successfully";

/* --------------------------------------------------------------------------
Types
-------------------------------------------------------------------------- */

/// A review as submitted by the caller. Lives for one request only.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSubmission {
    pub product_id: ProductId,
    pub num_star: i32,
    #[serde(default)]
    pub content: String,
    /// Encoded images, each `data:image/<type>;base64,<payload>`.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Outward-facing shape of a created review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedReview {
    pub id: DbId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// URLs of images that were both relayed and stored, in submission order.
    pub image_urls: Vec<String>,
    pub num_star: i32,
    pub content: String,
}

/// Result of a successful `CreateReview` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateReviewResponse {
    pub message: String,
    pub review: CreatedReview,
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that a product identifier is a positive key.
pub fn validate_product_id(product_id: ProductId) -> Result<(), CoreError> {
    if product_id <= 0 {
        return Err(CoreError::Validation(format!(
            "product_id must be positive (got {product_id})"
        )));
    }
    Ok(())
}

/// Validate that a rating lies within `MIN_NUM_STAR..=MAX_NUM_STAR`.
pub fn validate_num_star(num_star: i32) -> Result<(), CoreError> {
    if !(MIN_NUM_STAR..=MAX_NUM_STAR).contains(&num_star) {
        return Err(CoreError::Validation(format!(
            "num_star must be between {MIN_NUM_STAR} and {MAX_NUM_STAR} (got {num_star})"
        )));
    }
    Ok(())
}

/// Validate review text: may be empty, must fit the length limit.
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    let len = content.chars().count();
    if len > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "content exceeds maximum length of {MAX_CONTENT_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate the number of attached images.
///
/// Individual payloads are not inspected here; a malformed image is skipped
/// during relay rather than rejecting the whole review.
pub fn validate_image_count(count: usize) -> Result<(), CoreError> {
    if count > MAX_IMAGES_PER_REVIEW {
        return Err(CoreError::Validation(format!(
            "at most {MAX_IMAGES_PER_REVIEW} images may be attached (got {count})"
        )));
    }
    Ok(())
}

/// Run every submission check in order, stopping at the first failure.
pub fn validate_submission(submission: &ReviewSubmission) -> Result<(), CoreError> {
    validate_product_id(submission.product_id)?;
    validate_num_star(submission.num_star)?;
    validate_content(&submission.content)?;
    validate_image_count(submission.images.len())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
