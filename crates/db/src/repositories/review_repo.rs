//! Repository for the `reviews` table.

use review_core::types::{DbId, ProductId};
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, product_id, num_star, content, created_at, updated_at";

/// Provides insert, lookup and delete operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a new review, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateReview) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (user_id, product_id, num_star, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(input.user_id)
            .bind(input.product_id)
            .bind(input.num_star)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    /// Find a review by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reviews for a product, most recent first.
    pub async fn list_for_product(
        pool: &PgPool,
        product_id: ProductId,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews WHERE product_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a review and, through the cascade, its images.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
