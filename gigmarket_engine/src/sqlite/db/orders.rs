use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, PaymentId, Role},
    traits::OrderFlowError,
};

/// Inserts the order, returning `false` in the second parameter if an order with the same payment
/// id already exists.
///
/// The insert and the duplicate check are a single statement. `ON CONFLICT .. DO NOTHING` leans
/// on the unique index over `payment_id`, so when the checkout confirmation and the webhook race
/// each other, exactly one of them gets a row back from `RETURNING` and the other falls through
/// to fetching the winner's row. There is deliberately no "does it exist yet?" query ahead of the
/// insert; under concurrency that check is stale by the time the insert runs.
pub async fn idempotent_insert(order: NewOrder, conn: &mut SqliteConnection) -> Result<(Order, bool), OrderFlowError> {
    let inserted: Option<Order> = sqlx::query_as(
        r#"
            INSERT INTO orders (
                gig_id,
                buyer_id,
                seller_id,
                payment_id,
                gateway_order_id,
                signature,
                amount,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (payment_id) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(order.gig_id)
    .bind(order.buyer_id)
    .bind(order.seller_id)
    .bind(order.payment_id.clone())
    .bind(order.gateway_order_id)
    .bind(order.signature)
    .bind(order.amount)
    .bind(order.status)
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        Some(order) => {
            debug!("📝️ Order for payment [{}] inserted with id {}", order.payment_id, order.id);
            Ok((order, true))
        },
        None => {
            let existing = fetch_order_by_payment_id(&order.payment_id, conn)
                .await?
                .ok_or_else(|| OrderFlowError::OrderNotFound(order.payment_id.clone()))?;
            debug!("📝️ Order for payment [{}] already exists with id {}", existing.payment_id, existing.id);
            Ok((existing, false))
        },
    }
}

pub async fn fetch_order_by_payment_id(
    payment_id: &PaymentId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE payment_id = $1")
        .bind(payment_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Orders where the user appears on the side their role dictates, newest first.
pub async fn fetch_orders_for_user(
    user_id: &str,
    role: Role,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let column = match role {
        Role::Client => "buyer_id",
        Role::Freelancer => "seller_id",
    };
    let orders = sqlx::query_as(&format!("SELECT * FROM orders WHERE {column} = $1 ORDER BY created_at DESC, id DESC"))
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// The order (if any) that entitles `buyer_id` to review `gig_id`: a paid purchase of the gig by
/// this buyer that has not already backed a review.
pub async fn fetch_reviewable_order(
    gig_id: i64,
    buyer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE gig_id = $1 AND buyer_id = $2 AND has_reviewed = 0 AND status IN ('paid', 'completed')
            ORDER BY created_at LIMIT 1
        "#,
    )
    .bind(gig_id)
    .bind(buyer_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Consumes the order's review entitlement. Returns `false` if the order was already consumed,
/// so a racing submission cannot double-spend it.
pub async fn mark_order_reviewed(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET has_reviewed = 1, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND has_reviewed = 0",
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
