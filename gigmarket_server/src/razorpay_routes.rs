//------------------------------------------   Razorpay webhook  -----------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use gigmarket_engine::{traits::OrderManagement, OrderFlowApi, PaymentCapture};
use log::{debug, info, trace, warn};
use razorpay_tools::WebhookEvent;

use crate::{
    config::{ServerOptions, WebhookSecret},
    data_objects::JsonResponse,
    helpers::{client_ip, verify_webhook_signature},
    route,
};

/// The header Razorpay uses to deliver the HMAC-SHA256 signature of the raw request body.
pub const RAZORPAY_SIGNATURE_HEADER: &str = "x-razorpay-signature";

route!(razorpay_webhook => Post "/webhook/razorpay" impl OrderManagement);
/// Route handler for Razorpay webhook deliveries.
///
/// The signature is verified over the raw bytes of the body, before any deserialization, so the body is taken as
/// [`web::Bytes`] rather than `web::Json`.
pub async fn razorpay_webhook<B>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
    secret: web::Data<WebhookSecret>,
    options: web::Data<ServerOptions>,
) -> HttpResponse
where
    B: OrderManagement,
{
    trace!("🛍️️ Received webhook request: {}", req.uri());
    // Webhook responses must always be in the 200 range, otherwise Razorpay will retry the delivery
    let result = handle_webhook_delivery(&req, &body, api.as_ref(), secret.as_ref(), *options.as_ref()).await;
    HttpResponse::Ok().json(result)
}

async fn handle_webhook_delivery<B: OrderManagement>(
    req: &HttpRequest,
    body: &[u8],
    api: &OrderFlowApi<B>,
    secret: &WebhookSecret,
    options: ServerOptions,
) -> JsonResponse {
    let Some(signature) = req.headers().get(RAZORPAY_SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!(
            "🛍️️ Webhook delivery from {} without a {RAZORPAY_SIGNATURE_HEADER} header was rejected.",
            client_ip(req, options.trust_proxy_headers)
        );
        return JsonResponse::failure("Missing signature header.");
    };
    if !verify_webhook_signature(secret.reveal(), body, signature) {
        warn!(
            "🚨️ Webhook delivery from {} carried an INVALID signature. The payload was not processed.",
            client_ip(req, options.trust_proxy_headers)
        );
        return JsonResponse::failure("Invalid signature.");
    }
    let event = match serde_json::from_slice::<WebhookEvent>(body) {
        Ok(event) => event,
        Err(e) => {
            warn!("🛍️️ Could not deserialize webhook payload. {e}");
            return JsonResponse::failure("Could not deserialize payload.");
        },
    };
    if !event.is_payment_captured() {
        debug!("🛍️️ Ignoring webhook event '{}'.", event.event);
        return JsonResponse::success(format!("Event {} ignored.", event.event));
    }
    let payment = event.payload.payment.entity;
    let Some(notes) = payment.notes else {
        warn!("🛍️️ Captured payment {} carries no notes. The buyer and gig cannot be identified.", payment.id);
        return JsonResponse::failure("Payment notes are missing.");
    };
    let gig_id = match notes.gig_id.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            warn!("🛍️️ Captured payment {} has a malformed gig id note: {}", payment.id, notes.gig_id);
            return JsonResponse::failure("Malformed gig id in payment notes.");
        },
    };
    let capture = PaymentCapture {
        payment_id: payment.id.into(),
        gateway_order_id: payment.order_id,
        amount: payment.amount,
        buyer_id: notes.buyer_id,
        gig_id,
    };
    match api.payment_captured(capture).await {
        Ok((order, true)) => {
            info!("🛍️️ Webhook recorded order {} for gig {}.", order.id, order.gig_id);
            JsonResponse::success("Order recorded.")
        },
        Ok((order, false)) => {
            info!("🛍️️ Webhook for payment id {} absorbed into existing order {}.", order.payment_id, order.id);
            JsonResponse::success("Order already recorded.")
        },
        Err(e) => {
            warn!("🛍️️ Could not process captured payment. {e}");
            JsonResponse::failure(e)
        },
    }
}
