use chrono::Utc;
use gmk_common::{Paise, INR_CURRENCY_CODE};
use serde::{Deserialize, Serialize};

/// The only webhook event type that results in an order being recorded.
pub const PAYMENT_CAPTURED_EVENT: &str = "payment.captured";

/// Context attached to a payment intent so that the asynchronous webhook can recover the buyer
/// and gig without a database lookup. Razorpay stores note values as strings and echoes them back
/// verbatim on the payment entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentNotes {
    #[serde(rename = "buyerId")]
    pub buyer_id: String,
    #[serde(rename = "gigId")]
    pub gig_id: String,
}

/// Request body for the gateway's order-creation endpoint (`POST /v1/orders`).
#[derive(Debug, Clone, Serialize)]
pub struct NewPaymentIntent {
    pub amount: Paise,
    pub currency: String,
    pub receipt: String,
    pub notes: IntentNotes,
}

impl NewPaymentIntent {
    /// A new INR intent for the given buyer and gig. The receipt is informational only; the
    /// idempotency key for order reconciliation is the payment reference the gateway assigns
    /// later.
    pub fn inr(amount: Paise, buyer_id: &str, gig_id: i64) -> Self {
        let receipt = format!("rcpt_{}", Utc::now().timestamp_millis());
        Self {
            amount,
            currency: INR_CURRENCY_CODE.to_string(),
            receipt,
            notes: IntentNotes { buyer_id: buyer_id.to_string(), gig_id: gig_id.to_string() },
        }
    }
}

/// The gateway's view of a created payment intent (Razorpay calls this an "order").
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: Paise,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<IntentNotes>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// A webhook delivery. Only `payload.payment.entity` is of interest here.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub payment: PaymentWrapper,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentWrapper {
    pub entity: PaymentEntity,
}

/// The payment entity carried inside webhook events. Amounts are minor units (paise).
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub amount: Paise,
    #[serde(default)]
    pub currency: Option<String>,
    /// The gateway order reference the payment settles.
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<IntentNotes>,
}

impl WebhookEvent {
    pub fn is_payment_captured(&self) -> bool {
        self.event == PAYMENT_CAPTURED_EVENT
    }

    pub fn payment(&self) -> &PaymentEntity {
        &self.payload.payment.entity
    }
}
