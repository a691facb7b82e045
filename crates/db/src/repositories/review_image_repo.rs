//! Repository for the `review_images` table.

use review_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::ReviewImage;

const COLUMNS: &str = "id, review_id, image_url, position, created_at, updated_at";

pub struct ReviewImageRepo;

impl ReviewImageRepo {
    /// Record a stored image URL for a review.
    pub async fn create(
        pool: &PgPool,
        review_id: DbId,
        image_url: &str,
        position: i32,
    ) -> Result<ReviewImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO review_images (review_id, image_url, position)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewImage>(&query)
            .bind(review_id)
            .bind(image_url)
            .bind(position)
            .fetch_one(pool)
            .await
    }

    /// Image URLs of a review in submission order.
    pub async fn list_urls_for_review(
        pool: &PgPool,
        review_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT image_url FROM review_images WHERE review_id = $1 ORDER BY position, id",
        )
        .bind(review_id)
        .fetch_all(pool)
        .await
    }
}
