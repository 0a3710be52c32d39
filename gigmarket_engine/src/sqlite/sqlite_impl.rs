//! `SqliteDatabase` is a concrete implementation of a GigMarket engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`](crate::traits)
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, gigs, messages, new_pool, orders, reviews};
use crate::{
    db_types::{Gig, Message, NewMessage, NewOrder, NewReview, Order, PaymentId, Rating, Review, Role},
    traits::{
        ChatApiError,
        MessageManagement,
        OrderFlowError,
        OrderManagement,
        ReviewApiError,
        ReviewManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderManagement for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_gig(&self, gig_id: i64) -> Result<Option<Gig>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let gig = gigs::fetch_gig(gig_id, &mut conn).await?;
        Ok(gig)
    }

    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::idempotent_insert(order, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_order_by_payment_id(&self, payment_id: &PaymentId) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_payment_id(payment_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user_id: &str, role: Role) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, role, &mut conn).await?;
        trace!("🗃️ {} orders fetched for {role} [{user_id}]", orders.len());
        Ok(orders)
    }
}

impl ReviewManagement for SqliteDatabase {
    async fn fetch_reviewable_order(&self, gig_id: i64, buyer_id: &str) -> Result<Option<Order>, ReviewApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_reviewable_order(gig_id, buyer_id, &mut conn).await?;
        Ok(order)
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, ReviewApiError> {
        let mut conn = self.pool.acquire().await?;
        let review = reviews::insert_review(review, &mut conn).await?;
        Ok(review)
    }

    async fn review_exists(&self, gig_id: i64, reviewer_id: &str) -> Result<bool, ReviewApiError> {
        let mut conn = self.pool.acquire().await?;
        let exists = reviews::review_exists(gig_id, reviewer_id, &mut conn).await?;
        Ok(exists)
    }

    async fn add_rating_to_gig(&self, gig_id: i64, rating: Rating) -> Result<(), ReviewApiError> {
        let mut conn = self.pool.acquire().await?;
        gigs::add_rating(gig_id, rating, &mut conn).await
    }

    async fn mark_order_reviewed(&self, order_id: i64) -> Result<bool, ReviewApiError> {
        let mut conn = self.pool.acquire().await?;
        let marked = orders::mark_order_reviewed(order_id, &mut conn).await?;
        Ok(marked)
    }

    async fn fetch_reviews_for_gig(&self, gig_id: i64) -> Result<Vec<Review>, ReviewApiError> {
        let mut conn = self.pool.acquire().await?;
        let reviews = reviews::fetch_reviews_for_gig(gig_id, &mut conn).await?;
        trace!("🗃️ {} reviews fetched for gig {gig_id}", reviews.len());
        Ok(reviews)
    }
}

impl MessageManagement for SqliteDatabase {
    async fn insert_message(&self, message: NewMessage) -> Result<Message, ChatApiError> {
        let mut conn = self.pool.acquire().await?;
        let message = messages::insert_message(message, &mut conn).await?;
        Ok(message)
    }

    async fn fetch_messages_for_conversation(&self, conversation_id: &str) -> Result<Vec<Message>, ChatApiError> {
        let mut conn = self.pool.acquire().await?;
        let messages = messages::fetch_messages_for_conversation(conversation_id, &mut conn).await?;
        trace!("🗃️ {} messages fetched for conversation {conversation_id}", messages.len());
        Ok(messages)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
