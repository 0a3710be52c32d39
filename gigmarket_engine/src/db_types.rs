use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use gmk_common::Paise;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        Role         ---------------------------------------------------------

/// The role claim carried by every authenticated principal. Clients buy gigs and write reviews;
/// freelancers sell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Freelancer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Freelancer => write!(f, "freelancer"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "freelancer" => Ok(Self::Freelancer),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------      PaymentId      ---------------------------------------------------------

/// A lightweight wrapper around the payment reference assigned by the gateway (`pay_…`). This is
/// the idempotency key for order creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct PaymentId(pub String);

impl FromStr for PaymentId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl<S: Into<String>> From<S> for PaymentId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PaymentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The purchase has been initiated but no payment confirmation has arrived yet.
    Processing,
    /// Payment has been captured by the gateway. The canonical terminal state.
    Paid,
    /// Legacy alias for [`OrderStatusType::Paid`]. Still readable from old rows, never written.
    Completed,
    /// The payment attempt failed.
    Failed,
}

impl OrderStatusType {
    /// True for terminal statuses that unlock review eligibility.
    pub fn is_paid(&self) -> bool {
        matches!(self, OrderStatusType::Paid | OrderStatusType::Completed)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Processing => write!(f, "processing"),
            OrderStatusType::Paid => write!(f, "paid"),
            OrderStatusType::Completed => write!(f, "completed"),
            OrderStatusType::Failed => write!(f, "failed"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Processing");
            OrderStatusType::Processing
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "paid" => Ok(Self::Paid),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub gig_id: i64,
    pub buyer_id: String,
    pub seller_id: String,
    pub payment_id: PaymentId,
    /// The gateway's order reference (`order_…`), distinct from the payment reference.
    pub gateway_order_id: String,
    /// The checkout signature supplied by the client confirmation path. Webhook-created orders
    /// have none.
    pub signature: Option<String>,
    pub amount: Paise,
    pub status: OrderStatusType,
    pub has_reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub gig_id: i64,
    pub buyer_id: String,
    /// Always resolved from the gig record so that both creation paths agree on the seller.
    pub seller_id: String,
    /// The payment reference assigned by the gateway. The idempotency key.
    pub payment_id: PaymentId,
    pub gateway_order_id: String,
    pub signature: Option<String>,
    pub amount: Paise,
    pub status: OrderStatusType,
}

impl NewOrder {
    /// Orders are only recorded once a payment confirmation exists, so new records are born in
    /// the `paid` state.
    pub fn new(gig_id: i64, buyer_id: &str, seller_id: &str, payment_id: PaymentId, amount: Paise) -> Self {
        Self {
            gig_id,
            buyer_id: buyer_id.to_string(),
            seller_id: seller_id.to_string(),
            payment_id,
            gateway_order_id: String::new(),
            signature: None,
            amount,
            status: OrderStatusType::Paid,
        }
    }

    pub fn with_gateway_order_id(mut self, gateway_order_id: String) -> Self {
        self.gateway_order_id = gateway_order_id;
        self
    }

    pub fn with_signature(mut self, signature: String) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Whether this creation attempt describes the same purchase as the stored order. The
    /// signature and the gateway order reference are excluded: only the client path carries a
    /// signature, and the payment reference alone is the key.
    pub fn is_equivalent(&self, order: &Order) -> bool {
        self.payment_id == order.payment_id
            && self.gig_id == order.gig_id
            && self.buyer_id == order.buyer_id
            && self.seller_id == order.seller_id
            && self.amount == order.amount
    }
}

//--------------------------------------        Gig          ---------------------------------------------------------

/// The slice of a gig this engine cares about: who sells it, what it costs, and the running
/// rating aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Gig {
    pub id: i64,
    pub seller_id: String,
    pub title: String,
    pub price: Paise,
    /// Sum of all review ratings. Only ever mutated together with `star_count`.
    pub total_stars: i64,
    pub star_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gig {
    pub fn average_rating(&self) -> Option<f64> {
        (self.star_count > 0).then(|| self.total_stars as f64 / self.star_count as f64)
    }
}

//--------------------------------------       Rating        ---------------------------------------------------------

/// A review score, guaranteed to lie in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Rating(i32);

#[derive(Debug, Clone, Error)]
#[error("Ratings run from 1 to 5 stars. {0} is not a valid rating")]
pub struct RatingError(i32);

impl Rating {
    pub const MAX: i32 = 5;
    pub const MIN: i32 = 1;

    pub fn new(value: i32) -> Result<Self, RatingError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError(value))
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}★", self.0)
    }
}

//--------------------------------------       Review        ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub gig_id: i64,
    pub reviewer_id: String,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub gig_id: i64,
    pub reviewer_id: String,
    pub rating: Rating,
    pub comment: Option<String>,
}

impl NewReview {
    pub fn new(gig_id: i64, reviewer_id: &str, rating: Rating) -> Self {
        Self { gig_id, reviewer_id: reviewer_id.to_string(), rating, comment: None }
    }

    pub fn with_comment(mut self, comment: String) -> Self {
        self.comment = Some(comment);
        self
    }
}

//--------------------------------------      Message        ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A chat message about to be persisted. Messages are always stored, whether or not the
/// recipient is connected; live delivery is a separate, best-effort concern.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
}
