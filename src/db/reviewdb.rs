use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::reviewmodel::Review;

const REVIEW_COLUMNS: &str = r#"
    id, order_id, reviewer_id, reviewee_id, rating, comment, created_at
"#;

#[async_trait]
pub trait ReviewExt {
    async fn create_review(
        &self,
        order_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, sqlx::Error>;

    async fn get_review_by_reviewer(
        &self,
        order_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, sqlx::Error>;

    async fn get_reviews_for_user(
        &self,
        reviewee_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Review>, sqlx::Error>;

    /// Average rating across all reviews received by a user, or None when
    /// the user has no reviews yet.
    async fn get_average_rating(
        &self,
        reviewee_id: Uuid,
    ) -> Result<Option<BigDecimal>, sqlx::Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn create_review(
        &self,
        order_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO reviews (order_id, reviewer_id, reviewee_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REVIEW_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Review>(&query)
            .bind(order_id)
            .bind(reviewer_id)
            .bind(reviewee_id)
            .bind(rating)
            .bind(comment)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_review_by_reviewer(
        &self,
        order_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE order_id = $1 AND reviewer_id = $2"
        );

        sqlx::query_as::<_, Review>(&query)
            .bind(order_id)
            .bind(reviewer_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_reviews_for_user(
        &self,
        reviewee_id: Uuid,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * limit as i64;
        let query = format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE reviewee_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        sqlx::query_as::<_, Review>(&query)
            .bind(reviewee_id)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_average_rating(
        &self,
        reviewee_id: Uuid,
    ) -> Result<Option<BigDecimal>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<BigDecimal>>(
            "SELECT ROUND(AVG(rating)::numeric, 2) FROM reviews WHERE reviewee_id = $1",
        )
        .bind(reviewee_id)
        .fetch_one(&self.pool)
        .await
    }
}
