use actix_web::{http::StatusCode, test::TestRequest};
use checkout_engine::db_types::{Role, ShippingAddress};
use serde_json::{json, Value};

use super::helpers::{bearer, issue_token, send_request, TestBackend};

fn saved_address() -> ShippingAddress {
    ShippingAddress::new("221B MG Road", "Bengaluru", "560001")
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}

/// A verify body the way the storefront sends it: cart lines copied from the stored cart, a fractional coupon
/// discount and the gateway's own field names.
fn verify_body(payment_id: &str, order_id: &str, signature: &str) -> Value {
    json!({
        "razorpay_payment_id": payment_id,
        "razorpay_order_id": order_id,
        "razorpay_signature": signature,
        "orderItems": [{"product": "A", "_id": "64f0c0ffee", "quantity": 2, "price": 99.5}],
        "totalAmount": 199,
        "couponApplied": {"code": "SAVE10", "discountPercentage": 10, "discountAmount": 24.95}
    })
}

#[actix_web::test]
async fn checkout_session_is_opened_with_the_gateway() {
    let backend = TestBackend::new().await;
    let req = TestRequest::post().uri("/payments/checkout").set_json(json!({"totalAmount": 499.5}));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json = parse(&body);
    assert_eq!(json["success"], true);
    assert_eq!(json["order"]["id"], "order_fake0001");
    assert_eq!(json["order"]["currency"], "INR");
    assert_eq!(backend.gateway.created_orders()[0].amount.value(), 500);

    let req = TestRequest::post().uri("/payments/checkout").set_json(json!({"totalAmount": 0}));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json = parse(&body);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
    backend.tear_down().await;
}

#[actix_web::test]
async fn verified_payment_becomes_an_order_once() {
    let backend = TestBackend::new().await;
    backend.add_product("A", 100, 10).await;
    let account_id = backend.customer("asha@example.com", Some(saved_address())).await;
    let token = issue_token(account_id, vec![Role::Customer]);
    let signature = backend.captured_payment("pay_1", "order_1", 199);

    let req = TestRequest::post()
        .uri("/payments/verify")
        .insert_header(bearer(&token))
        .set_json(verify_body("pay_1", "order_1", &signature));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json = parse(&body);
    assert_eq!(json["success"], true);
    let order_id = json["orderId"].as_i64().expect("No order id");
    assert!(json.get("alreadyProcessed").is_none());
    assert!(json.get("needsAddress").is_none());
    assert_eq!(backend.stock("A").await, 8);

    let req = TestRequest::post()
        .uri("/payments/verify")
        .insert_header(bearer(&token))
        .set_json(verify_body("pay_1", "order_1", &signature));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json = parse(&body);
    assert_eq!(json["success"], true);
    assert_eq!(json["alreadyProcessed"], true);
    assert_eq!(json["orderId"].as_i64(), Some(order_id));
    assert_eq!(backend.stock("A").await, 8);
    backend.tear_down().await;
}

#[actix_web::test]
async fn forged_signatures_are_refused() {
    let backend = TestBackend::new().await;
    backend.add_product("A", 100, 10).await;
    backend.captured_payment("pay_2", "order_2", 199);
    let req = TestRequest::post().uri("/payments/verify").set_json(verify_body("pay_2", "order_2", "deadbeef"));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json = parse(&body);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert_eq!(backend.stock("A").await, 10);
    backend.tear_down().await;
}

#[actix_web::test]
async fn payments_without_an_address_are_parked_and_resumed() {
    let backend = TestBackend::new().await;
    backend.add_product("A", 100, 10).await;
    let account_id = backend.customer("later@example.com", None).await;
    let token = issue_token(account_id, vec![Role::Customer]);
    let signature = backend.captured_payment("pay_3", "order_3", 199);

    let req = TestRequest::post()
        .uri("/payments/verify")
        .insert_header(bearer(&token))
        .set_json(verify_body("pay_3", "order_3", &signature));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json = parse(&body);
    assert_eq!(json["success"], false);
    assert_eq!(json["needsAddress"], true);
    assert!(json.get("orderId").is_none());

    let req = TestRequest::get().uri("/payments/pending/order_3").insert_header(bearer(&token));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(parse(&body)["pending"]["totalAmount"], 199);

    let req = TestRequest::post()
        .uri("/payments/pending/order_3/resume")
        .insert_header(bearer(&token))
        .set_json(json!({"shippingAddress": {"street": "4 Park Street", "city": "Kolkata", "zipCode": "700016"}}));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json = parse(&body);
    assert_eq!(json["success"], true);
    assert!(json["orderId"].is_i64());
    assert_eq!(backend.stock("A").await, 8);
    backend.tear_down().await;
}

#[actix_web::test]
async fn guest_with_a_partial_address_is_asked_for_one() {
    let backend = TestBackend::new().await;
    let signature = backend.captured_payment("pay_4", "order_4", 199);
    let mut body = verify_body("pay_4", "order_4", &signature);
    body["shippingAddress"] = json!({"street": "9 Linking Road", "state": "MH"});
    let req = TestRequest::post().uri("/payments/verify").set_json(body);
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json = parse(&body);
    assert_eq!(json["success"], false);
    assert_eq!(json["needsAddress"], true);
    backend.tear_down().await;
}

#[actix_web::test]
async fn only_admins_move_orders_through_fulfillment() {
    let backend = TestBackend::new().await;
    backend.add_product("A", 100, 10).await;
    let account_id = backend.customer("ravi@example.com", Some(saved_address())).await;
    let customer = issue_token(account_id, vec![Role::Customer]);
    let signature = backend.captured_payment("pay_5", "order_5", 199);
    let req = TestRequest::post()
        .uri("/payments/verify")
        .insert_header(bearer(&customer))
        .set_json(verify_body("pay_5", "order_5", &signature));
    let (_, body) = send_request(req, backend.configure()).await;
    let order_id = parse(&body)["orderId"].as_i64().expect("No order id");
    assert_eq!(backend.stock("A").await, 8);
    let path = format!("/orders/{order_id}/status");

    let req = TestRequest::put().uri(&path).insert_header(bearer(&customer)).set_json(json!({"status": "cancelled"}));
    let (status, _) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(backend.stock("A").await, 8);

    let admin = issue_token(1000, vec![Role::Admin]);
    let req = TestRequest::put().uri(&path).insert_header(bearer(&admin)).set_json(json!({"status": "refunded"}));
    let (status, _) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::put().uri(&path).insert_header(bearer(&admin)).set_json(json!({"status": "cancelled"}));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let json = parse(&body);
    assert_eq!(json["changed"], true);
    assert_eq!(json["order"]["status"], "cancelled");
    assert_eq!(backend.stock("A").await, 10);

    let req = TestRequest::put().uri(&path).insert_header(bearer(&admin)).set_json(json!({"status": "cancelled"}));
    let (status, body) = send_request(req, backend.configure()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(parse(&body)["changed"], false);
    assert_eq!(backend.stock("A").await, 10);
    backend.tear_down().await;
}
