mod checkout_flow;
mod helpers;
mod mocks;
mod orders;
mod payments;

use actix_web::{http::StatusCode, test::TestRequest, web::ServiceConfig};

use crate::routes::health;

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        cfg.service(health);
    }
    let (status, body) = helpers::send_request(TestRequest::get().uri("/health"), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}
