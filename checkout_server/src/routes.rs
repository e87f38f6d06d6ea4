//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here is async and all I/O (database and gateway
//! calls) is awaited, so workers keep serving other requests while a handler waits.
//!
//! Payment verification is special: once the gateway has confirmed the capture, the work must finish even if the
//! client hangs up. The reconcile call is therefore run on its own task, and the handler only awaits its result.
use actix_web::{get, web, HttpResponse, Responder};
use checkout_engine::{
    db_types::{FulfillmentStatus, Role},
    CheckoutDatabase,
    FulfillmentApi,
    OrderManagement,
    OrdersApi,
    PaymentGateway,
    PendingPaymentApi,
    PendingPaymentManagement,
    ReconciliationApi,
};
use log::*;

use crate::{
    auth::{JwtClaims, OptionalClaims},
    data_objects::{
        CheckoutSessionRequest,
        CheckoutSessionResponse,
        GatewayKeyResponse,
        OrderListParams,
        OrderListResponse,
        OrderResponse,
        PendingPaymentResponse,
        ResumePaymentRequest,
        UpdateStatusRequest,
        UpdateStatusResponse,
        VerifyPaymentRequest,
        VerifyPaymentResponse,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+) => {
        paste::paste! {
            pub struct [<$name:camel Route>]<$([<T $bounds>]),+>($(core::marker::PhantomData<fn() -> [<T $bounds>]>),+);

            impl<$([<T $bounds>]),+> [<$name:camel Route>]<$([<T $bounds>]),+> {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self($(core::marker::PhantomData::<fn() -> [<T $bounds>]>),+)
                }
            }

            impl<$([<T $bounds>]),+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds>]),+>
            where
                $([<T $bounds>]: $bounds + 'static,)+
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name::<$([<T $bounds>]),+>);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+ where requires [$($roles:expr),+]) => {
        paste::paste! {
            pub struct [<$name:camel Route>]<$([<T $bounds>]),+>($(core::marker::PhantomData<fn() -> [<T $bounds>]>),+);

            impl<$([<T $bounds>]),+> [<$name:camel Route>]<$([<T $bounds>]),+> {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self {
                    Self($(core::marker::PhantomData::<fn() -> [<T $bounds>]>),+)
                }
            }

            impl<$([<T $bounds>]),+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds>]),+>
            where
                $([<T $bounds>]: $bounds + 'static,)+
            {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name::<$([<T $bounds>]),+>)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };
}

/// The key id the storefront hands to the payment widget. It is public, unlike the key secret.
#[derive(Debug, Clone)]
pub struct GatewayKey(pub String);

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(checkout => Post "/payments/checkout" impl CheckoutDatabase, PaymentGateway);
/// Opens a checkout session: registers an order for the amount with the gateway and returns it to the client, which
/// then completes payment against the gateway order id.
pub async fn checkout<B, G>(
    body: web::Json<CheckoutSessionRequest>,
    api: web::Data<ReconciliationApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
{
    let amount = body.amount()?;
    debug!("💻️ POST checkout for {amount}");
    let order = api.create_checkout_session(amount, body.currency.as_deref()).await?;
    Ok(HttpResponse::Ok().json(CheckoutSessionResponse { success: true, order }))
}

#[get("/payments/key")]
pub async fn gateway_key(key: web::Data<GatewayKey>) -> impl Responder {
    trace!("💻️ GET gateway key");
    HttpResponse::Ok().json(GatewayKeyResponse { key: key.0.clone() })
}

route!(verify_payment => Post "/payments/verify" impl CheckoutDatabase, PaymentGateway);
/// Turns a completed payment into an order.
///
/// Guests may call this route. Logged in customers get the order on their account, their saved address is used when
/// none is sent, and their cart is emptied.
///
/// Responses:
/// * `{success: true, orderId}` when a new order was created.
/// * `{success: true, alreadyProcessed: true, orderId}` when this payment was seen before.
/// * `{success: false, needsAddress: true}` when no address is known. The payment is kept and can be resumed.
pub async fn verify_payment<B, G>(
    claims: OptionalClaims,
    body: web::Json<VerifyPaymentRequest>,
    api: web::Data<ReconciliationApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + 'static,
    G: PaymentGateway + 'static,
{
    let request = body.into_inner().into_reconcile_request(claims.account_id())?;
    debug!("💻️ POST verify for payment {} (account {:?})", request.payment_id, request.account_id);
    let api = api.into_inner();
    let outcome = actix_web::rt::spawn(async move { api.reconcile(request).await })
        .await
        .map_err(|e| ServerError::Unspecified(format!("The reconciliation task did not complete. {e}")))??;
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse::from(outcome)))
}

route!(pending_payment => Get "/payments/pending/{gateway_order_id}" impl PendingPaymentManagement);
/// Shows a parked payment to the account that made it.
pub async fn pending_payment<B: PendingPaymentManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<PendingPaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let gateway_order_id = path.into_inner();
    debug!("💻️ GET pending payment {gateway_order_id} for account #{}", claims.sub);
    let pending = api.pending_payment_for_account(&gateway_order_id, claims.account_id()).await?;
    Ok(HttpResponse::Ok().json(PendingPaymentResponse { success: true, pending }))
}

route!(resume_payment => Post "/payments/pending/{gateway_order_id}/resume" impl CheckoutDatabase, PaymentGateway);
/// Completes a parked payment. The body may carry a shipping address. Without one, the account's saved addresses are
/// tried again.
pub async fn resume_payment<B, G>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: Option<web::Json<ResumePaymentRequest>>,
    api: web::Data<ReconciliationApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase + 'static,
    G: PaymentGateway + 'static,
{
    let gateway_order_id = path.into_inner();
    let address = body.and_then(|b| b.into_inner().shipping_address);
    debug!("💻️ POST resume pending payment {gateway_order_id} for account #{}", claims.sub);
    let api = api.into_inner();
    let account_id = claims.account_id();
    let outcome = actix_web::rt::spawn(async move {
        api.resume_pending_payment(&gateway_order_id, Some(account_id), address).await
    })
    .await
    .map_err(|e| ServerError::Unspecified(format!("The reconciliation task did not complete. {e}")))??;
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse::from(outcome)))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl OrderManagement);
/// The caller's own orders, newest first. Supports `status`, `page` and `limit` query parameters.
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    query: web::Query<OrderListParams>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for account #{}", claims.sub);
    let status = query.status()?;
    let page = api.orders_for_account(claims.account_id(), status, query.page, query.limit).await?;
    Ok(HttpResponse::Ok().json(OrderListResponse { success: true, page }))
}

route!(all_orders => Get "/orders/all" impl OrderManagement where requires [Role::Admin]);
/// Every order in the store, ten to a page. Admins only.
pub async fn all_orders<B: OrderManagement>(
    query: web::Query<OrderListParams>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all_orders");
    let status = query.status()?;
    let page = api.all_orders(status, query.page).await?;
    Ok(HttpResponse::Ok().json(OrderListResponse { success: true, page }))
}

route!(my_order => Get "/orders/{id}" impl OrderManagement);
/// One of the caller's own orders. Orders belonging to other accounts are reported as not found.
pub async fn my_order<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id} for account #{}", claims.sub);
    let order = api
        .order_for_account(order_id, claims.account_id())
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order #{order_id}")))?;
    Ok(HttpResponse::Ok().json(OrderResponse { success: true, order }))
}

route!(update_order_status => Put "/orders/{id}/status" impl CheckoutDatabase where requires [Role::Admin]);
/// Moves an order through fulfillment. Cancelling an order puts its stock back.
pub async fn update_order_status<B: CheckoutDatabase>(
    path: web::Path<i64>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let status = body
        .status
        .parse::<FulfillmentStatus>()
        .map_err(|_| ServerError::BadRequest(format!("'{}' is not a valid order status", body.status)))?;
    info!("💻️ PUT order #{order_id} status -> {status}");
    let change = api.set_status(order_id, status).await?;
    Ok(HttpResponse::Ok().json(UpdateStatusResponse {
        success: true,
        order: change.order,
        changed: change.changed,
        restock_failures: change.restock_failures,
    }))
}
