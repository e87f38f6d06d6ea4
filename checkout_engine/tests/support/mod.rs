#![allow(dead_code)]

use checkout_common::{Paise, Secret};
use checkout_engine::{
    checkout_objects::{CartLine, ReconcileOptions, ReconcileOutcome, ReconcileRequest},
    db_types::{Order, ProductId, Role, ShippingAddress},
    events::EventProducers,
    test_utils::{
        fake_gateway::FakeGateway,
        prepare_env::{prepare_test_env, random_db_path},
    },
    CheckoutDatabase,
    InventoryManagement,
    ReconciliationApi,
    SignatureVerifier,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub const GATEWAY_SECRET: &str = "rzp_test_5ecret";

pub struct TestSystem {
    pub url: String,
    pub db: SqliteDatabase,
    pub gateway: FakeGateway,
    pub verifier: SignatureVerifier,
}

impl TestSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
        let verifier = SignatureVerifier::new(Secret::new(GATEWAY_SECRET.to_string()));
        Self { url, db, gateway: FakeGateway::new(), verifier }
    }

    pub fn api(&self) -> ReconciliationApi<SqliteDatabase, FakeGateway> {
        self.api_with(ReconcileOptions::default(), EventProducers::default())
    }

    pub fn api_with(
        &self,
        options: ReconcileOptions,
        producers: EventProducers,
    ) -> ReconciliationApi<SqliteDatabase, FakeGateway> {
        ReconciliationApi::new(self.db.clone(), self.gateway.clone(), self.verifier.clone())
            .with_options(options)
            .with_producers(producers)
    }

    /// A correctly signed request for a payment the gateway reports as captured.
    pub fn captured_request(&self, payment_id: &str, gateway_order_id: &str, items: Vec<CartLine>) -> ReconcileRequest {
        let total = items.iter().map(|l| l.price.unwrap_or_default() * l.quantity.unwrap_or(1)).sum::<Paise>();
        self.gateway.capture(payment_id, gateway_order_id, total);
        let signature = self.verifier.sign(gateway_order_id, payment_id);
        ReconcileRequest::new(payment_id, gateway_order_id, signature.as_str()).with_items(items, total)
    }

    pub async fn add_product(&self, product_id: &str, price: i64, stock: i64) {
        self.db
            .upsert_product(&ProductId::from(product_id), product_id, Paise::from(price), stock)
            .await
            .expect("Error adding product");
    }

    pub async fn stock(&self, product_id: &str) -> i64 {
        self.db
            .fetch_product(&ProductId::from(product_id))
            .await
            .expect("Error fetching product")
            .map(|p| p.stock)
            .expect("Product does not exist")
    }

    pub async fn customer(&self, email: &str) -> i64 {
        self.db.create_account(email, "Test Customer", Role::Customer).await.expect("Error creating account").id
    }

    pub async fn customer_with_address(&self, email: &str) -> (i64, ShippingAddress) {
        let id = self.customer(email).await;
        let address = ShippingAddress::new("221B MG Road", "Bengaluru", "560001").with_state("Karnataka");
        self.db.add_address(id, &address).await.expect("Error adding address");
        (id, address)
    }

    /// Runs a full reconcile for a customer with a saved address and returns the new order.
    pub async fn paid_order(&self, payment_id: &str, items: Vec<CartLine>) -> Order {
        let (account_id, _) = self.customer_with_address(&format!("{payment_id}@example.com")).await;
        let request =
            self.captured_request(payment_id, &format!("order_{payment_id}"), items).with_account_id(account_id);
        match self.api().reconcile(request).await.expect("Reconcile failed") {
            ReconcileOutcome::Created { order, .. } => order,
            other => panic!("Expected a new order, got {other:?}"),
        }
    }

    pub async fn tear_down(mut self) {
        if let Err(e) = self.db.close().await {
            error!("🚀️ Failed to close database: {e}");
        }
        if let Err(e) = Sqlite::drop_database(&self.url).await {
            warn!("🚀️ Failed to drop database {}: {e}", self.url);
        }
    }
}
