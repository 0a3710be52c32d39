use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use gigmarket_engine::{
    db_types::{Gig, Order, OrderStatusType, Role},
    OrderFlowApi,
};
use gmk_common::Paise;
use serde_json::json;

use super::helpers::{get_request, issue_token, post_request};
use crate::{
    endpoint_tests::mocks::MockOrderManager,
    routes::{ConfirmOrderRoute, MyOrdersRoute},
};

fn test_gig() -> Gig {
    Gig {
        id: 7,
        seller_id: "seller-1".to_string(),
        title: "I will design your logo".to_string(),
        price: Paise::from(129_900),
        total_stars: 0,
        star_count: 0,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    }
}

fn recorded_order() -> Order {
    Order {
        id: 1,
        gig_id: 7,
        buyer_id: "buyer-77".to_string(),
        seller_id: "seller-1".to_string(),
        payment_id: "pay_abc123".into(),
        gateway_order_id: "order_xyz789".to_string(),
        signature: Some("f00d".repeat(16)),
        amount: Paise::from(129_900),
        status: OrderStatusType::Paid,
        has_reviewed: false,
        created_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
    }
}

fn confirmation_body() -> serde_json::Value {
    json!({
        "gigId": 7,
        "paymentId": "pay_abc123",
        "orderId": "order_xyz789",
        "signature": "f00d".repeat(16),
        "amount": 129_900,
    })
}

#[actix_web::test]
async fn confirming_a_checkout_records_the_order() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-77", Role::Client);
    let (status, body) =
        post_request(&token, "/orders/confirm", confirmation_body(), configure_create).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let result: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(result["created"], true);
    assert_eq!(result["order"]["payment_id"], "pay_abc123");
    assert_eq!(result["order"]["status"], "paid");
    assert_eq!(result["order"]["seller_id"], "seller-1");
    Ok(())
}

#[actix_web::test]
async fn replayed_confirmation_returns_the_existing_order() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-77", Role::Client);
    let (status, body) =
        post_request(&token, "/orders/confirm", confirmation_body(), configure_replay).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let result: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(result["created"], false);
    assert_eq!(result["order"]["payment_id"], "pay_abc123");
    Ok(())
}

#[actix_web::test]
async fn confirmation_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("", "/orders/confirm", confirmation_body(), configure_untouched).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No access token was provided."));
}

#[actix_web::test]
async fn freelancers_cannot_confirm_checkouts() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("seller-1", Role::Freelancer);
    let (status, body) =
        post_request(&token, "/orders/confirm", confirmation_body(), configure_untouched).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("requires the client role"));
}

#[actix_web::test]
async fn blank_confirmation_fields_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-77", Role::Client);
    let mut body = confirmation_body();
    body["signature"] = json!("");
    let (status, body) = post_request(&token, "/orders/confirm", body, configure_untouched).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("paymentId, orderId and signature are all required"));
}

#[actix_web::test]
async fn missing_confirmation_fields_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-77", Role::Client);
    let body = json!({ "gigId": 7, "amount": 129_900 });
    let (status, _) = post_request(&token, "/orders/confirm", body, configure_untouched).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn my_orders_are_scoped_to_the_token_principal() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-77", Role::Client);
    let (status, body) = get_request(&token, "/orders", configure_my_orders).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let orders: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(orders.as_array().map(Vec::len), Some(1));
    assert_eq!(orders[0]["buyer_id"], "buyer-77");
    Ok(())
}

#[actix_web::test]
async fn my_orders_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request("", "/orders", configure_untouched).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

fn configure_create(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_gig().returning(|_| Ok(Some(test_gig())));
    orders
        .expect_insert_order()
        .withf(|order| order.payment_id.as_str() == "pay_abc123" && order.signature.is_some())
        .returning(|_| Ok((recorded_order(), true)));
    cfg.service(ConfirmOrderRoute::<MockOrderManager>::new()).app_data(web::Data::new(OrderFlowApi::new(orders)));
}

fn configure_replay(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_gig().returning(|_| Ok(Some(test_gig())));
    orders.expect_insert_order().returning(|_| Ok((recorded_order(), false)));
    cfg.service(ConfirmOrderRoute::<MockOrderManager>::new()).app_data(web::Data::new(OrderFlowApi::new(orders)));
}

// For requests that must be rejected before the storage layer is ever consulted.
fn configure_untouched(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_gig().times(0);
    orders.expect_insert_order().times(0);
    orders.expect_fetch_orders_for_user().times(0);
    cfg.service(ConfirmOrderRoute::<MockOrderManager>::new())
        .service(MyOrdersRoute::<MockOrderManager>::new())
        .app_data(web::Data::new(OrderFlowApi::new(orders)));
}

fn configure_my_orders(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders
        .expect_fetch_orders_for_user()
        .withf(|user_id, role| user_id == "buyer-77" && *role == Role::Client)
        .returning(|_, _| Ok(vec![recorded_order()]));
    cfg.service(MyOrdersRoute::<MockOrderManager>::new()).app_data(web::Data::new(OrderFlowApi::new(orders)));
}
