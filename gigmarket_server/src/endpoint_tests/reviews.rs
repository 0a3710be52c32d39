use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use gigmarket_engine::{
    db_types::{Gig, Order, OrderStatusType, Rating, Review, Role},
    OrderFlowApi,
    ReviewApi,
};
use gmk_common::Paise;
use serde_json::json;

use super::helpers::{get_request, issue_token, post_request};
use crate::{
    endpoint_tests::mocks::{MockOrderManager, MockReviewManager},
    routes::{GigReviewsRoute, SubmitReviewRoute},
};

fn reviewable_order() -> Order {
    Order {
        id: 3,
        gig_id: 7,
        buyer_id: "buyer-77".to_string(),
        seller_id: "seller-1".to_string(),
        payment_id: "pay_abc123".into(),
        gateway_order_id: "order_xyz789".to_string(),
        signature: None,
        amount: Paise::from(129_900),
        status: OrderStatusType::Paid,
        has_reviewed: false,
        created_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
    }
}

fn stored_review() -> Review {
    Review {
        id: 11,
        gig_id: 7,
        reviewer_id: "buyer-77".to_string(),
        rating: Rating::new(5).unwrap(),
        comment: Some("Stellar work".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 6, 12, 8, 30, 0).unwrap(),
    }
}

fn rated_gig() -> Gig {
    Gig {
        id: 7,
        seller_id: "seller-1".to_string(),
        title: "I will design your logo".to_string(),
        price: Paise::from(129_900),
        total_stars: 9,
        star_count: 2,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 6, 12, 8, 30, 0).unwrap(),
    }
}

fn submission_body() -> serde_json::Value {
    json!({ "gigId": 7, "rating": 5, "comment": "Stellar work" })
}

#[actix_web::test]
async fn a_qualifying_buyer_can_review() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-77", Role::Client);
    let (status, body) = post_request(&token, "/reviews", submission_body(), configure_accepts).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let review: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(review["rating"], 5);
    assert_eq!(review["reviewer_id"], "buyer-77");
    assert_eq!(review["comment"], "Stellar work");
    Ok(())
}

#[actix_web::test]
async fn review_without_a_purchase_is_forbidden() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-77", Role::Client);
    let (status, body) = post_request(&token, "/reviews", submission_body(), configure_not_entitled).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("has no completed purchase"));
}

#[actix_web::test]
async fn double_reviews_are_forbidden() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-77", Role::Client);
    let (status, body) = post_request(&token, "/reviews", submission_body(), configure_already_reviewed).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("has already reviewed gig"));
}

#[actix_web::test]
async fn out_of_range_ratings_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-77", Role::Client);
    for rating in [0, 6] {
        let body = json!({ "gigId": 7, "rating": rating });
        let (status, body) = post_request(&token, "/reviews", body, configure_untouched).await.unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("not a valid rating"));
    }
}

#[actix_web::test]
async fn freelancers_cannot_review() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("seller-1", Role::Freelancer);
    let (status, body) = post_request(&token, "/reviews", submission_body(), configure_untouched).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("requires the client role"));
}

#[actix_web::test]
async fn anyone_can_browse_gig_reviews() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/reviews/7", configure_listing).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let listing: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(listing["gigId"], 7);
    assert_eq!(listing["averageRating"], 4.5);
    assert_eq!(listing["reviewCount"], 2);
    assert_eq!(listing["reviews"][0]["rating"], 5);
    Ok(())
}

#[actix_web::test]
async fn reviews_for_a_missing_gig_are_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/reviews/999", configure_missing_gig).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Gig 999 does not exist"));
}

fn configure_accepts(cfg: &mut ServiceConfig) {
    let mut reviews = MockReviewManager::new();
    reviews
        .expect_fetch_reviewable_order()
        .withf(|gig_id, buyer_id| *gig_id == 7 && buyer_id == "buyer-77")
        .returning(|_, _| Ok(Some(reviewable_order())));
    reviews.expect_review_exists().returning(|_, _| Ok(false));
    reviews.expect_insert_review().returning(|_| Ok(stored_review()));
    reviews
        .expect_add_rating_to_gig()
        .withf(|gig_id, rating| *gig_id == 7 && rating.value() == 5)
        .returning(|_, _| Ok(()));
    reviews.expect_mark_order_reviewed().returning(|_| Ok(true));
    cfg.service(SubmitReviewRoute::<MockReviewManager>::new()).app_data(web::Data::new(ReviewApi::new(reviews)));
}

fn configure_not_entitled(cfg: &mut ServiceConfig) {
    let mut reviews = MockReviewManager::new();
    reviews.expect_fetch_reviewable_order().returning(|_, _| Ok(None));
    reviews.expect_insert_review().times(0);
    reviews.expect_add_rating_to_gig().times(0);
    cfg.service(SubmitReviewRoute::<MockReviewManager>::new()).app_data(web::Data::new(ReviewApi::new(reviews)));
}

fn configure_already_reviewed(cfg: &mut ServiceConfig) {
    let mut reviews = MockReviewManager::new();
    reviews.expect_fetch_reviewable_order().returning(|_, _| Ok(Some(reviewable_order())));
    reviews.expect_review_exists().returning(|_, _| Ok(true));
    reviews.expect_insert_review().times(0);
    reviews.expect_add_rating_to_gig().times(0);
    cfg.service(SubmitReviewRoute::<MockReviewManager>::new()).app_data(web::Data::new(ReviewApi::new(reviews)));
}

// For requests that must be rejected before the storage layer is ever consulted.
fn configure_untouched(cfg: &mut ServiceConfig) {
    let mut reviews = MockReviewManager::new();
    reviews.expect_fetch_reviewable_order().times(0);
    reviews.expect_insert_review().times(0);
    reviews.expect_add_rating_to_gig().times(0);
    cfg.service(SubmitReviewRoute::<MockReviewManager>::new()).app_data(web::Data::new(ReviewApi::new(reviews)));
}

fn configure_listing(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_gig().returning(|_| Ok(Some(rated_gig())));
    let mut reviews = MockReviewManager::new();
    reviews.expect_fetch_reviews_for_gig().returning(|_| {
        let older = Review {
            id: 10,
            rating: Rating::new(4).unwrap(),
            comment: None,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            ..stored_review()
        };
        Ok(vec![stored_review(), older])
    });
    cfg.service(GigReviewsRoute::<MockOrderManager, MockReviewManager>::new())
        .app_data(web::Data::new(OrderFlowApi::new(orders)))
        .app_data(web::Data::new(ReviewApi::new(reviews)));
}

fn configure_missing_gig(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_fetch_gig().returning(|_| Ok(None));
    let mut reviews = MockReviewManager::new();
    reviews.expect_fetch_reviews_for_gig().times(0);
    cfg.service(GigReviewsRoute::<MockOrderManager, MockReviewManager>::new())
        .app_data(web::Data::new(OrderFlowApi::new(orders)))
        .app_data(web::Data::new(ReviewApi::new(reviews)));
}
