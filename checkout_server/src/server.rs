use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use checkout_engine::{
    events::EventProducers,
    FulfillmentApi,
    OrdersApi,
    PendingPaymentApi,
    ReconciliationApi,
    SignatureVerifier,
    SqliteDatabase,
};
use log::*;
use razorpay_tools::RazorpayApi;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    integrations::{create_order_log_handlers, RazorpayGateway},
    routes::{
        gateway_key,
        health,
        AllOrdersRoute,
        CheckoutRoute,
        GatewayKey,
        MyOrderRoute,
        MyOrdersRoute,
        PendingPaymentRoute,
        ResumePaymentRoute,
        UpdateOrderStatusRoute,
        VerifyPaymentRoute,
    },
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
        info!("🚀️ Database migrations are up to date");
    }
    if config.payment_signature_secret().is_empty() {
        warn!("🚨️ No Razorpay key secret is configured. Every payment will fail signature verification.");
    }
    let api = RazorpayApi::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = RazorpayGateway::new(api);
    let handlers = create_order_log_handlers();
    let producers = handlers.producers();
    handlers.start_handlers();
    let _sweeper = start_expiry_worker(db.clone(), config.reconcile.storage_timeout, config.pending_sweep_interval);
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: RazorpayGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let storage_timeout = config.reconcile.storage_timeout;
        let verifier = SignatureVerifier::new(config.payment_signature_secret());
        let reconciliation_api = ReconciliationApi::new(db.clone(), gateway.clone(), verifier)
            .with_options(config.reconcile.clone())
            .with_producers(producers.clone());
        let orders_api = OrdersApi::new(db.clone()).with_storage_timeout(storage_timeout);
        let pending_api = PendingPaymentApi::new(db.clone()).with_storage_timeout(storage_timeout);
        let fulfillment_api = FulfillmentApi::new(db.clone(), producers.clone()).with_storage_timeout(storage_timeout);
        let token_issuer = TokenIssuer::new(&config.auth);
        let key = GatewayKey(gateway.key_id().to_string());
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
        let api_scope = web::scope("/api")
            .service(gateway_key)
            .service(CheckoutRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(PendingPaymentRoute::<SqliteDatabase>::new())
            .service(ResumePaymentRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            // Must be registered before `/orders/{id}`, which would otherwise match it
            .service(AllOrdersRoute::<SqliteDatabase>::new())
            .service(MyOrderRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("checkout::access_log"))
            .app_data(json_config)
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(pending_api))
            .app_data(web::Data::new(fulfillment_api))
            .app_data(web::Data::new(token_issuer))
            .app_data(web::Data::new(key))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
