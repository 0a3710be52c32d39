use thiserror::Error;

use crate::db_types::{Gig, NewOrder, Order, PaymentId, Role};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No gig with id {0} exists")]
    GigNotFound(i64),
    #[error("No order with payment id {0} exists")]
    OrderNotFound(PaymentId),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The storage backend behaviour needed by the order reconciliation flow.
///
/// The one subtle requirement is [`insert_order`](Self::insert_order): two creation paths (the
/// client's checkout confirmation and the gateway's webhook) race to record the same purchase,
/// and the backend's uniqueness constraint on the payment id is the arbiter. Implementations
/// must resolve the race in storage, in a single statement, rather than checking for an existing
/// row first.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// A descriptor for the backend, used in log messages.
    fn url(&self) -> &str;

    async fn fetch_gig(&self, gig_id: i64) -> Result<Option<Gig>, OrderFlowError>;

    /// Inserts a new order, or returns the existing one if an order with the same payment id has
    /// already been recorded. The boolean is `true` when this call created the row.
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), OrderFlowError>;

    async fn fetch_order_by_payment_id(&self, payment_id: &PaymentId) -> Result<Option<Order>, OrderFlowError>;

    /// Every order the given user participates in, as buyer or seller according to their role.
    /// Newest first.
    async fn fetch_orders_for_user(&self, user_id: &str, role: Role) -> Result<Vec<Order>, OrderFlowError>;
}
