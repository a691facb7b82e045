//! Review and review image entity models.

use review_core::types::{DbId, ProductId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A review row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub num_star: i32,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a review.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub num_star: i32,
    pub content: String,
}

/// A row from the `review_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewImage {
    pub id: DbId,
    pub review_id: DbId,
    pub image_url: String,
    /// Index of the image in the submitted list.
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
