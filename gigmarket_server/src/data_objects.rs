use gigmarket_engine::db_types::{Order, Review};
use gmk_common::Paise;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: std::fmt::Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: std::fmt::Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub gig_id: i64,
}

/// Everything the frontend checkout widget needs to open the gateway's payment dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub intent_id: String,
    /// The amount in minor units, echoed back so the widget displays what will actually be charged.
    pub amount: Paise,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedOrder {
    pub order: Order,
    /// `true` when this confirmation created the order, `false` when it was already on record.
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    pub gig_id: i64,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigReviews {
    pub gig_id: i64,
    /// Mean rating over all reviews, or `None` when the gig has no reviews yet.
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub reviews: Vec<Review>,
}
