use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use gigmarket_engine::{
    db_types::{Gig, Order, OrderStatusType},
    OrderFlowApi,
};
use gmk_common::{Paise, Secret};

use super::helpers::send_request;
use crate::{
    config::{ServerOptions, WebhookSecret},
    endpoint_tests::mocks::MockOrderManager,
    helpers::calculate_hmac,
    razorpay_routes::{RazorpayWebhookRoute, RAZORPAY_SIGNATURE_HEADER},
};

const TEST_WEBHOOK_SECRET: &str = "webhook-test-secret-000000000000";

// The signature is computed over the exact bytes on the wire, so the payloads are kept as literal
// strings rather than `json!` values.
const CAPTURED_EVENT: &str = r#"{"entity":"event","event":"payment.captured","contains":["payment"],"payload":{"payment":{"entity":{"id":"pay_DESlfW9H8K9uqM","entity":"payment","amount":2000,"currency":"INR","status":"captured","order_id":"order_DESlLckIVRkHWj","method":"upi","notes":{"buyerId":"u-buyer-1","gigId":"42"},"created_at":1567674599}}},"created_at":1567674606}"#;

const FAILED_EVENT: &str = r#"{"entity":"event","event":"payment.failed","contains":["payment"],"payload":{"payment":{"entity":{"id":"pay_DESlfW9H8K9uqM","entity":"payment","amount":2000,"currency":"INR","status":"failed","order_id":"order_DESlLckIVRkHWj","method":"upi","notes":{"buyerId":"u-buyer-1","gigId":"42"},"created_at":1567674599}}},"created_at":1567674606}"#;

const CAPTURED_EVENT_WITHOUT_NOTES: &str = r#"{"entity":"event","event":"payment.captured","contains":["payment"],"payload":{"payment":{"entity":{"id":"pay_DESlfW9H8K9uqM","entity":"payment","amount":2000,"currency":"INR","status":"captured","order_id":"order_DESlLckIVRkHWj","method":"upi","created_at":1567674599}}},"created_at":1567674606}"#;

fn webhook_gig() -> Gig {
    Gig {
        id: 42,
        seller_id: "seller-9".to_string(),
        title: "I will build your website".to_string(),
        price: Paise::from(2000),
        total_stars: 0,
        star_count: 0,
        created_at: Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap(),
    }
}

fn webhook_order() -> Order {
    Order {
        id: 5,
        gig_id: 42,
        buyer_id: "u-buyer-1".to_string(),
        seller_id: "seller-9".to_string(),
        payment_id: "pay_DESlfW9H8K9uqM".into(),
        gateway_order_id: "order_DESlLckIVRkHWj".to_string(),
        signature: None,
        amount: Paise::from(2000),
        status: OrderStatusType::Paid,
        has_reviewed: false,
        created_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
    }
}

fn sign(body: &str) -> String {
    calculate_hmac(TEST_WEBHOOK_SECRET, body.as_bytes())
}

async fn deliver(body: &'static str, signature: &str, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let req = TestRequest::post()
        .uri("/webhook/razorpay")
        .insert_header((RAZORPAY_SIGNATURE_HEADER, signature))
        .insert_header(("content-type", "application/json"))
        .set_payload(body);
    send_request(req, "", configure).await.unwrap()
}

#[actix_web::test]
async fn captured_payment_records_an_order() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = deliver(CAPTURED_EVENT, &sign(CAPTURED_EVENT), configure_capture).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(response["success"], true);
    assert_eq!(response["message"], "Order recorded.");
    Ok(())
}

#[actix_web::test]
async fn replayed_delivery_is_absorbed() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = deliver(CAPTURED_EVENT, &sign(CAPTURED_EVENT), configure_replay).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(response["success"], true);
    assert_eq!(response["message"], "Order already recorded.");
    Ok(())
}

// A rejected delivery must still be acknowledged with a 200, or the gateway keeps retrying it.
#[actix_web::test]
async fn forged_signature_is_acknowledged_but_not_processed() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let mut forged = sign(CAPTURED_EVENT);
    forged.replace_range(0..4, "0000");
    let (status, body) = deliver(CAPTURED_EVENT, &forged, configure_untouched).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "Invalid signature.");
    Ok(())
}

#[actix_web::test]
async fn missing_signature_header_is_acknowledged_but_not_processed() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/webhook/razorpay")
        .insert_header(("content-type", "application/json"))
        .set_payload(CAPTURED_EVENT);
    let (status, body) = send_request(req, "", configure_untouched).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "Missing signature header.");
    Ok(())
}

#[actix_web::test]
async fn non_capture_events_are_ignored() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = deliver(FAILED_EVENT, &sign(FAILED_EVENT), configure_untouched).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(response["success"], true);
    assert_eq!(response["message"], "Event payment.failed ignored.");
    Ok(())
}

#[actix_web::test]
async fn captures_without_notes_are_not_processed() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        deliver(CAPTURED_EVENT_WITHOUT_NOTES, &sign(CAPTURED_EVENT_WITHOUT_NOTES), configure_untouched).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "Payment notes are missing.");
    Ok(())
}

fn register(cfg: &mut ServiceConfig, orders: MockOrderManager) {
    cfg.service(RazorpayWebhookRoute::<MockOrderManager>::new())
        .app_data(web::Data::new(OrderFlowApi::new(orders)))
        .app_data(web::Data::new(WebhookSecret(Secret::new(TEST_WEBHOOK_SECRET.to_string()))))
        .app_data(web::Data::new(ServerOptions::default()));
}

fn configure_capture(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_gig().withf(|gig_id| *gig_id == 42).returning(|_| Ok(Some(webhook_gig())));
    orders
        .expect_insert_order()
        .withf(|order| {
            order.payment_id.as_str() == "pay_DESlfW9H8K9uqM" &&
                order.buyer_id == "u-buyer-1" &&
                order.seller_id == "seller-9" &&
                order.signature.is_none()
        })
        .returning(|_| Ok((webhook_order(), true)));
    register(cfg, orders);
}

fn configure_replay(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_gig().returning(|_| Ok(Some(webhook_gig())));
    orders.expect_insert_order().returning(|_| Ok((webhook_order(), false)));
    register(cfg, orders);
}

// Deliveries that fail verification or carry unusable payloads must never reach the storage layer.
fn configure_untouched(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_gig().times(0);
    orders.expect_insert_order().times(0);
    register(cfg, orders);
}
