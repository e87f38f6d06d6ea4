use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use checkout_engine::{db_types::Role, OrderPage, OrdersApi};

use super::{
    helpers::{bearer, issue_token, sample_order, send_request},
    mocks::MockOrderManager,
};
use crate::routes::{AllOrdersRoute, MyOrderRoute, MyOrdersRoute};

#[actix_web::test]
async fn fetch_my_orders_without_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri("/orders"), configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No access token was provided"), "{body}");
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, vec![Role::Customer]);
    let req = TestRequest::get().uri("/orders?page=1&limit=5").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["orders"][0]["id"], 7);
    assert_eq!(json["totalItems"], 1);
}

#[actix_web::test]
async fn fetch_my_orders_from_the_cookie() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, vec![Role::Customer]);
    let req = TestRequest::get().uri("/orders").cookie(actix_web::cookie::Cookie::new("checkout_token", token));
    let (status, _) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn fetch_my_orders_with_a_bad_status_filter() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, vec![Role::Customer]);
    let req = TestRequest::get().uri("/orders?status=lost").insert_header(bearer(&token));
    let (status, _) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn fetch_my_orders_with_a_tampered_token() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token(1, vec![Role::Customer]);
    token.replace_range(token.len() - 10..token.len() - 5, "AAAAA");
    let req = TestRequest::get().uri("/orders").insert_header(bearer(&token));
    let (status, _) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn fetch_all_orders_as_a_customer() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, vec![Role::Customer]);
    let req = TestRequest::get().uri("/orders/all").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Insufficient Permissions"), "{body}");
}

#[actix_web::test]
async fn fetch_all_orders_as_admin() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(99, vec![Role::Admin]);
    let req = TestRequest::get().uri("/orders/all?status=processing").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["orders"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn fetch_my_order() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, vec![Role::Customer]);
    let req = TestRequest::get().uri("/orders/7").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["order"]["id"], 7);
}

#[actix_web::test]
async fn someone_elses_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(2, vec![Role::Customer]);
    let req = TestRequest::get().uri("/orders/7").insert_header(bearer(&token));
    let (status, _) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut orders = MockOrderManager::new();
    orders.expect_search_orders().returning(|query| {
        let page = match query.account_id {
            Some(id) => OrderPage::new(vec![sample_order(7, Some(id))], query.page(), query.limit(), 1),
            None => OrderPage::new(vec![sample_order(7, Some(1)), sample_order(8, None)], query.page(), 10, 2),
        };
        Ok(page)
    });
    orders.expect_fetch_order().returning(|id| Ok((id == 7).then(|| sample_order(7, Some(1)))));
    let orders_api = OrdersApi::new(orders);
    cfg.service(MyOrdersRoute::<MockOrderManager>::new())
        .service(AllOrdersRoute::<MockOrderManager>::new())
        .service(MyOrderRoute::<MockOrderManager>::new())
        .app_data(web::Data::new(orders_api));
}
