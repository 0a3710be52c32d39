use thiserror::Error;

use crate::db_types::{NewReview, Order, Rating, Review};

#[derive(Debug, Clone, Error)]
pub enum ReviewApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User {user_id} has no completed purchase of gig {gig_id} to review")]
    NotEntitled { user_id: String, gig_id: i64 },
    #[error("User {user_id} has already reviewed gig {gig_id}")]
    AlreadyReviewed { user_id: String, gig_id: i64 },
}

impl ReviewApiError {
    /// Maps a storage error on review insertion. The only unique constraint reachable from that
    /// statement is (gig_id, reviewer_id), so a uniqueness violation always means a duplicate
    /// review.
    pub fn from_insert_error(e: sqlx::Error, user_id: &str, gig_id: i64) -> Self {
        match e {
            sqlx::Error::Database(de) if de.is_unique_violation() => {
                Self::AlreadyReviewed { user_id: user_id.to_string(), gig_id }
            },
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for ReviewApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Storage behaviour for the review lifecycle.
///
/// Rating aggregates never recompute from the reviews table. Each accepted review bumps the
/// gig's running totals once, via [`add_rating_to_gig`](Self::add_rating_to_gig), and averages
/// are derived from those totals at read time.
#[allow(async_fn_in_trait)]
pub trait ReviewManagement {
    /// The order that entitles `buyer_id` to review `gig_id`: paid, belonging to the buyer, and
    /// not yet consumed by an earlier review. `None` when no such order exists.
    async fn fetch_reviewable_order(&self, gig_id: i64, buyer_id: &str) -> Result<Option<Order>, ReviewApiError>;

    async fn insert_review(&self, review: NewReview) -> Result<Review, ReviewApiError>;

    async fn review_exists(&self, gig_id: i64, reviewer_id: &str) -> Result<bool, ReviewApiError>;

    /// Adds `rating` to the gig's star total and bumps the star count, atomically.
    async fn add_rating_to_gig(&self, gig_id: i64, rating: Rating) -> Result<(), ReviewApiError>;

    /// Flags the order as having produced a review. Returns `false` if the order was already
    /// flagged (or does not exist).
    async fn mark_order_reviewed(&self, order_id: i64) -> Result<bool, ReviewApiError>;

    /// All reviews for a gig, newest first.
    async fn fetch_reviews_for_gig(&self, gig_id: i64) -> Result<Vec<Review>, ReviewApiError>;
}
