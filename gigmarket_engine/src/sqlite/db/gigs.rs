use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Gig, Rating},
    traits::ReviewApiError,
};

pub async fn fetch_gig(gig_id: i64, conn: &mut SqliteConnection) -> Result<Option<Gig>, sqlx::Error> {
    let gig = sqlx::query_as("SELECT * FROM gigs WHERE id = $1").bind(gig_id).fetch_optional(conn).await?;
    Ok(gig)
}

/// Folds a new rating into the gig's running aggregate. Both columns move in one statement, so
/// concurrent reviews serialise in the database and no read-modify-write window exists.
pub async fn add_rating(gig_id: i64, rating: Rating, conn: &mut SqliteConnection) -> Result<(), ReviewApiError> {
    let result = sqlx::query(
        r#"
            UPDATE gigs SET
                total_stars = total_stars + $1,
                star_count = star_count + 1,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
        "#,
    )
    .bind(rating.value())
    .bind(gig_id)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ReviewApiError::DatabaseError(format!(
            "Gig {gig_id} vanished while adding a rating to it. The review stands but the aggregate was not updated."
        )));
    }
    debug!("📝️ Gig {gig_id} aggregate bumped by {rating}");
    Ok(())
}
