use gmk_common::Paise;
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Gig, NewOrder, Order, PaymentId, Role},
    traits::{OrderFlowError, OrderManagement},
};

/// The client-side half of a completed checkout, as reported by the frontend once the gateway's
/// checkout widget resolves. The serde representation matches the checkout widget's own field
/// names, so this struct doubles as the wire format for the confirmation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfirmation {
    pub gig_id: i64,
    pub payment_id: PaymentId,
    #[serde(rename = "orderId")]
    pub gateway_order_id: String,
    pub signature: String,
    pub amount: Paise,
}

/// A `payment.captured` notification, as reported by the gateway's webhook. Webhooks carry no
/// checkout signature, and older gateway payloads may omit the order reference.
#[derive(Debug, Clone)]
pub struct PaymentCapture {
    pub payment_id: PaymentId,
    pub gateway_order_id: Option<String>,
    pub amount: Paise,
    pub buyer_id: String,
    pub gig_id: i64,
}

/// `OrderFlowApi` reconciles the two independent reports of a successful payment (client
/// confirmation and gateway webhook) into exactly one order record.
///
/// Neither path is "first" by design. Whichever lands first creates the order; the other is
/// absorbed against the stored row. The storage backend's uniqueness constraint on the payment
/// id decides the race, so both paths funnel through the same [`record_order`](Self) helper and
/// neither ever pre-checks for an existing row.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Handles the client's checkout confirmation. Idempotent: replays and webhook-first races
    /// return the already-stored order. The boolean is `true` when this call created the order.
    pub async fn checkout_confirmed(
        &self,
        buyer_id: &str,
        confirmation: CheckoutConfirmation,
    ) -> Result<(Order, bool), OrderFlowError> {
        debug!(
            "🔄️📦️ Checkout confirmation from buyer [{buyer_id}] for gig {} (payment id {})",
            confirmation.gig_id, confirmation.payment_id
        );
        let gig = self
            .db
            .fetch_gig(confirmation.gig_id)
            .await?
            .ok_or(OrderFlowError::GigNotFound(confirmation.gig_id))?;
        let order = NewOrder::new(gig.id, buyer_id, &gig.seller_id, confirmation.payment_id, confirmation.amount)
            .with_gateway_order_id(confirmation.gateway_order_id)
            .with_signature(confirmation.signature);
        self.record_order(order, "checkout confirmation").await
    }

    /// Handles a `payment.captured` webhook notification. Idempotent against the client path in
    /// exactly the same way.
    pub async fn payment_captured(&self, capture: PaymentCapture) -> Result<(Order, bool), OrderFlowError> {
        debug!(
            "🔄️📦️ Payment captured notification for gig {} (payment id {})",
            capture.gig_id, capture.payment_id
        );
        let gig = self.db.fetch_gig(capture.gig_id).await?.ok_or(OrderFlowError::GigNotFound(capture.gig_id))?;
        let order = NewOrder::new(gig.id, &capture.buyer_id, &gig.seller_id, capture.payment_id, capture.amount)
            .with_gateway_order_id(capture.gateway_order_id.unwrap_or_default());
        self.record_order(order, "webhook").await
    }

    pub async fn gig(&self, gig_id: i64) -> Result<Option<Gig>, OrderFlowError> {
        self.db.fetch_gig(gig_id).await
    }

    pub async fn order_by_payment_id(&self, payment_id: &PaymentId) -> Result<Option<Order>, OrderFlowError> {
        self.db.fetch_order_by_payment_id(payment_id).await
    }

    pub async fn orders_for_user(&self, user_id: &str, role: Role) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_orders_for_user(user_id, role).await
    }

    async fn record_order(&self, order: NewOrder, source: &str) -> Result<(Order, bool), OrderFlowError> {
        let payment_id = order.payment_id.clone();
        let (stored, inserted) = self.db.insert_order(order.clone()).await?;
        if inserted {
            info!(
                "🔄️📦️ Order {} created from {source}. Buyer [{}] paid {} for gig {} (payment id {payment_id})",
                stored.id, stored.buyer_id, stored.amount, stored.gig_id
            );
        } else {
            debug!("🔄️📦️ Order {} already recorded; {source} for payment id {payment_id} absorbed", stored.id);
            if !order.is_equivalent(&stored) {
                warn!(
                    "🔄️📦️ The {source} for payment id {payment_id} does not match the stored order {}. Received: \
                     gig {}, buyer [{}], amount {}. Stored: gig {}, buyer [{}], amount {}. Keeping the stored \
                     order.",
                    stored.id,
                    order.gig_id,
                    order.buyer_id,
                    order.amount,
                    stored.gig_id,
                    stored.buyer_id,
                    stored.amount
                );
            }
        }
        Ok((stored, inserted))
    }
}
