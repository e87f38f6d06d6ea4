use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_engine::{db_types::Role, PendingPaymentApi};

use super::{
    helpers::{bearer, issue_token, sample_pending_payment, send_request},
    mocks::MockPendingPaymentManager,
};
use crate::routes::{gateway_key, GatewayKey, PendingPaymentRoute};

#[actix_web::test]
async fn fetch_gateway_key() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri("/payments/key"), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"key":"rzp_test_key"}"#);
}

#[actix_web::test]
async fn fetch_own_pending_payment() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(5, vec![Role::Customer]);
    let req = TestRequest::get().uri("/payments/pending/order_5").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["pending"]["gatewayOrderId"], "order_5");
    assert!(json["pending"].get("signature").is_none());
}

#[actix_web::test]
async fn fetch_someone_elses_pending_payment() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(6, vec![Role::Customer]);
    let req = TestRequest::get().uri("/payments/pending/order_5").insert_header(bearer(&token));
    let (status, _) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn fetch_missing_pending_payment() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(5, vec![Role::Customer]);
    let req = TestRequest::get().uri("/payments/pending/order_404").insert_header(bearer(&token));
    let (status, _) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn pending_payments_need_a_login() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(TestRequest::get().uri("/payments/pending/order_5"), configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut pending = MockPendingPaymentManager::new();
    pending
        .expect_fetch_pending_payment()
        .returning(|id, _| Ok((id == "order_5").then(|| sample_pending_payment("order_5", Some(5)))));
    let pending_api = PendingPaymentApi::new(pending);
    cfg.service(PendingPaymentRoute::<MockPendingPaymentManager>::new())
        .service(gateway_key)
        .app_data(web::Data::new(pending_api))
        .app_data(web::Data::new(GatewayKey("rzp_test_key".to_string())));
}
