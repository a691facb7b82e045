//! Postgres-backed [`ReviewStore`] used by the review write path.

use review_core::error::StoreError;
use review_core::services::{NewReview, ReviewStore};
use review_core::types::DbId;

use crate::models::review::CreateReview;
use crate::repositories::{ReviewImageRepo, ReviewRepo};
use crate::DbPool;

/// Writes reviews and image references through the repositories.
#[derive(Clone)]
pub struct PgReviewStore {
    pool: DbPool,
}

impl PgReviewStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    StoreError(err.to_string())
}

impl ReviewStore for PgReviewStore {
    async fn insert_review(&self, review: &NewReview) -> Result<DbId, StoreError> {
        let input = CreateReview {
            user_id: review.user_id,
            product_id: review.product_id,
            num_star: review.num_star,
            content: review.content.clone(),
        };
        let row = ReviewRepo::create(&self.pool, &input)
            .await
            .map_err(store_error)?;
        tracing::debug!(review_id = row.id, product_id = row.product_id, "Review row inserted");
        Ok(row.id)
    }

    async fn insert_image(
        &self,
        review_id: DbId,
        image_url: &str,
        position: i32,
    ) -> Result<(), StoreError> {
        ReviewImageRepo::create(&self.pool, review_id, image_url, position)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
