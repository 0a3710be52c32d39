use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewReview, Review},
    traits::ReviewApiError,
};

/// Inserts a review. A uniqueness violation on (gig_id, reviewer_id) surfaces as
/// [`ReviewApiError::AlreadyReviewed`].
pub async fn insert_review(review: NewReview, conn: &mut SqliteConnection) -> Result<Review, ReviewApiError> {
    let NewReview { gig_id, reviewer_id, rating, comment } = review;
    let review: Review = sqlx::query_as(
        r#"
            INSERT INTO reviews (gig_id, reviewer_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(gig_id)
    .bind(reviewer_id.clone())
    .bind(rating)
    .bind(comment)
    .fetch_one(conn)
    .await
    .map_err(|e| ReviewApiError::from_insert_error(e, &reviewer_id, gig_id))?;
    debug!("📝️ Review {} by [{}] recorded for gig {gig_id}", review.id, review.reviewer_id);
    Ok(review)
}

pub async fn review_exists(gig_id: i64, reviewer_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE gig_id = $1 AND reviewer_id = $2)")
        .bind(gig_id)
        .bind(reviewer_id)
        .fetch_one(conn)
        .await?;
    Ok(exists)
}

pub async fn fetch_reviews_for_gig(gig_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Review>, sqlx::Error> {
    let reviews = sqlx::query_as("SELECT * FROM reviews WHERE gig_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(gig_id)
        .fetch_all(conn)
        .await?;
    Ok(reviews)
}
