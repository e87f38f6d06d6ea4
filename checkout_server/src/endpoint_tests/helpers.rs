use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use checkout_common::{Paise, Secret};
use checkout_engine::{
    db_types::{
        FulfillmentStatus,
        LineItem,
        Order,
        PaymentStatus,
        PendingPayment,
        PendingPaymentStatus,
        ProductId,
        Role,
        ShippingAddress,
    },
    events::EventProducers,
    test_utils::{
        fake_gateway::FakeGateway,
        prepare_env::{drop_test_database, prepare_test_env, random_db_path},
    },
    CheckoutDatabase,
    FulfillmentApi,
    InventoryManagement,
    PendingPaymentApi,
    ReconciliationApi,
    SignatureVerifier,
    SqliteDatabase,
};
use chrono::{Duration, TimeZone, Utc};
use log::debug;

use crate::{
    auth::TokenIssuer,
    config::AuthConfig,
    routes::{CheckoutRoute, PendingPaymentRoute, ResumePaymentRoute, UpdateOrderStatusRoute, VerifyPaymentRoute},
};

// DO NOT re-use this secret anywhere.
const TEST_JWT_SECRET: &str = "a2c6b7e0b3f94d1f8f0c6b8e2d4a9c71";

pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new(TEST_JWT_SECRET)
}

pub fn issue_token(account_id: i64, roles: Vec<Role>) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(account_id, roles).expect("Failed to issue token")
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Runs a single request against an app built by `configure`. Errors raised by middleware are converted into the
/// response the client would have seen.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().app_data(web::Data::new(TokenIssuer::new(&get_auth_config()))).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = res.into_body().try_into_bytes().unwrap_or_default();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

pub fn sample_order(id: i64, account_id: Option<i64>) -> Order {
    let created_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    Order {
        id,
        account_id,
        items: vec![LineItem::new("A", 2, Paise::from(100))],
        total_amount: Paise::from(200),
        currency: "INR".to_string(),
        gateway_order_id: format!("order_{id}"),
        gateway_payment_id: format!("pay_{id}"),
        gateway_signature: "sig".to_string(),
        payment_status: PaymentStatus::Paid,
        status: FulfillmentStatus::Processing,
        shipping_address: ShippingAddress::new("1 MG Road", "Pune", "411001"),
        coupon: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn sample_pending_payment(gateway_order_id: &str, account_id: Option<i64>) -> PendingPayment {
    let created_at = Utc::now();
    PendingPayment {
        id: 1,
        account_id,
        gateway_order_id: gateway_order_id.to_string(),
        gateway_payment_id: "pay_9".to_string(),
        signature: "sig".to_string(),
        cart_snapshot: vec![LineItem::new("A", 1, Paise::from(100))],
        total_amount: Paise::from(100),
        coupon: None,
        status: PendingPaymentStatus::Pending,
        created_at,
        expires_at: created_at + Duration::minutes(60),
    }
}

/// A real SQLite store and a scripted gateway behind the payment and fulfillment routes.
pub struct TestBackend {
    pub url: String,
    pub db: SqliteDatabase,
    pub gateway: FakeGateway,
    pub verifier: SignatureVerifier,
}

impl TestBackend {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
        let verifier = SignatureVerifier::new(Secret::new("rzp_test_endpoint_secret".to_string()));
        Self { url, db, gateway: FakeGateway::new(), verifier }
    }

    pub fn configure(&self) -> impl FnOnce(&mut ServiceConfig) {
        let reconciliation_api = ReconciliationApi::new(self.db.clone(), self.gateway.clone(), self.verifier.clone());
        let pending_api = PendingPaymentApi::new(self.db.clone());
        let fulfillment_api = FulfillmentApi::new(self.db.clone(), EventProducers::default());
        move |cfg| {
            cfg.service(CheckoutRoute::<SqliteDatabase, FakeGateway>::new())
                .service(VerifyPaymentRoute::<SqliteDatabase, FakeGateway>::new())
                .service(PendingPaymentRoute::<SqliteDatabase>::new())
                .service(ResumePaymentRoute::<SqliteDatabase, FakeGateway>::new())
                .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
                .app_data(web::Data::new(reconciliation_api))
                .app_data(web::Data::new(pending_api))
                .app_data(web::Data::new(fulfillment_api));
        }
    }

    /// Tells the gateway the payment was captured and returns the signature it would have handed the client.
    pub fn captured_payment(&self, payment_id: &str, gateway_order_id: &str, amount: i64) -> String {
        self.gateway.capture(payment_id, gateway_order_id, Paise::from(amount));
        self.verifier.sign(gateway_order_id, payment_id)
    }

    pub async fn add_product(&self, product_id: &str, price: i64, stock: i64) {
        self.db
            .upsert_product(&ProductId::from(product_id), product_id, Paise::from(price), stock)
            .await
            .expect("Error adding product");
    }

    pub async fn stock(&self, product_id: &str) -> i64 {
        let product = self.db.fetch_product(&ProductId::from(product_id)).await.expect("Error fetching product");
        product.map(|p| p.stock).expect("Product does not exist")
    }

    pub async fn customer(&self, email: &str, address: Option<ShippingAddress>) -> i64 {
        let account = self.db.create_account(email, "Test Customer", Role::Customer).await.expect("No account");
        if let Some(address) = address {
            self.db.add_address(account.id, &address).await.expect("Error adding address");
        }
        account.id
    }

    pub async fn tear_down(mut self) {
        let _ = self.db.close().await;
        drop_test_database(&self.url).await;
    }
}
