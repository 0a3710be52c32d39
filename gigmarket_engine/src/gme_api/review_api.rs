use log::*;

use crate::{
    db_types::{NewReview, Rating, Review},
    traits::{ReviewApiError, ReviewManagement},
};

/// `ReviewApi` enforces the review gate: one review per user per gig, and only after a paid
/// purchase.
pub struct ReviewApi<B> {
    db: B,
}

impl<B> ReviewApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ReviewApi<B>
where B: ReviewManagement
{
    /// Submits a review on behalf of `reviewer_id`.
    ///
    /// The eligibility checks up front give honest callers good error messages, but the
    /// (gig_id, reviewer_id) uniqueness constraint in storage is what actually holds the
    /// one-review line against concurrent submissions. Once the review row exists, the gig's
    /// rating aggregate is bumped exactly once and the qualifying order is consumed.
    pub async fn submit_review(
        &self,
        reviewer_id: &str,
        gig_id: i64,
        rating: Rating,
        comment: Option<String>,
    ) -> Result<Review, ReviewApiError> {
        debug!("⭐️ Review submission from [{reviewer_id}] for gig {gig_id}: {rating}");
        let order = self
            .db
            .fetch_reviewable_order(gig_id, reviewer_id)
            .await?
            .ok_or_else(|| ReviewApiError::NotEntitled { user_id: reviewer_id.to_string(), gig_id })?;
        if self.db.review_exists(gig_id, reviewer_id).await? {
            return Err(ReviewApiError::AlreadyReviewed { user_id: reviewer_id.to_string(), gig_id });
        }
        let mut new_review = NewReview::new(gig_id, reviewer_id, rating);
        if let Some(comment) = comment {
            new_review = new_review.with_comment(comment);
        }
        let review = self.db.insert_review(new_review).await?;
        self.db.add_rating_to_gig(gig_id, rating).await?;
        if !self.db.mark_order_reviewed(order.id).await? {
            // The review and the aggregate bump have both landed, so we keep the review and wear
            // the inconsistency rather than failing the caller.
            warn!(
                "⭐️ Review {} saved, but order {} could not be marked as reviewed. It may have been consumed by a \
                 concurrent submission.",
                review.id, order.id
            );
        }
        info!("⭐️ [{reviewer_id}] reviewed gig {gig_id}: {rating}");
        Ok(review)
    }

    pub async fn reviews_for_gig(&self, gig_id: i64) -> Result<Vec<Review>, ReviewApiError> {
        self.db.fetch_reviews_for_gig(gig_id).await
    }
}
