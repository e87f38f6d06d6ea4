use std::fmt::Debug;

use checkout_common::Paise;
use chrono::Utc;
use log::*;

use crate::{
    checkout_api::{
        bounded::within,
        checkout_objects::{
            CartLine,
            FollowUpReport,
            PricePolicy,
            ReconcileOptions,
            ReconcileOutcome,
            ReconcileRequest,
            StockAdjustmentFailure,
        },
        errors::ReconcileError,
    },
    db_types::{
        LineItem,
        NewOrder,
        NewPendingPayment,
        Order,
        PendingPayment,
        PendingPaymentStatus,
        ShippingAddress,
    },
    events::{EventProducers, OrderCreatedEvent, PaymentDeferredEvent},
    helpers::{PaymentSignature, SignatureVerifier},
    traits::{
        AccountDirectory,
        GatewayOrder,
        InsertOrderResult,
        InventoryError,
        InventoryManagement,
        OrderManagement,
        PaymentGateway,
        PendingPaymentManagement,
    },
};

/// `ReconciliationApi` turns a payment the customer completed at the gateway into a stored order.
///
/// A reconcile attempt walks through these stages:
/// 1. The request is validated and the gateway signature checked. Nothing is touched if either fails.
/// 2. The gateway is asked whether the payment was really captured.
/// 3. If an order already exists for the payment, it is returned unchanged. This makes every call safe to retry.
/// 4. A shipping address is resolved. Without one, the payment is parked as a pending payment and the caller is told
///    an address is needed.
/// 5. The order is written, and any pending payment for the same gateway order is closed in the same transaction.
/// 6. Stock is taken out for each line and the customer's cart is emptied. Failures here are reported, but never undo
///    the order: the customer has paid.
pub struct ReconciliationApi<B, G> {
    db: B,
    gateway: G,
    verifier: SignatureVerifier,
    options: ReconcileOptions,
    producers: EventProducers,
}

impl<B, G> Debug for ReconciliationApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({:?})", self.options)
    }
}

impl<B, G> ReconciliationApi<B, G> {
    pub fn new(db: B, gateway: G, verifier: SignatureVerifier) -> Self {
        Self { db, gateway, verifier, options: ReconcileOptions::default(), producers: EventProducers::default() }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_producers(mut self, producers: EventProducers) -> Self {
        self.producers = producers;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }
}

impl<B, G> ReconciliationApi<B, G>
where
    B: OrderManagement + PendingPaymentManagement + InventoryManagement + AccountDirectory,
    G: PaymentGateway,
{
    /// Registers a new order with the gateway so that the client can take payment against it.
    ///
    /// The amount is in paise and must be positive. The currency defaults to the configured one.
    pub async fn create_checkout_session(
        &self,
        amount: Paise,
        currency: Option<&str>,
    ) -> Result<GatewayOrder, ReconcileError> {
        if !amount.is_positive() {
            return Err(ReconcileError::InvalidAmount(format!("Checkout amount must be positive, not {amount}")));
        }
        let currency = currency.map(str::trim).filter(|c| !c.is_empty()).unwrap_or(self.options.currency.as_str());
        let receipt = format!("receipt_order_{}", Utc::now().timestamp_millis());
        let order = within(
            self.options.gateway_timeout,
            "Gateway order creation",
            self.gateway.create_order(amount, currency, &receipt),
        )
        .await??;
        info!("💳️ Checkout session {} opened for {amount} ({receipt})", order.id);
        Ok(order)
    }

    /// Reconciles a payment the client reports as complete. See the type-level docs for the stages.
    pub async fn reconcile(&self, request: ReconcileRequest) -> Result<ReconcileOutcome, ReconcileError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(ReconcileError::MissingFields(missing));
        }
        let ReconcileRequest {
            payment_id,
            gateway_order_id,
            signature,
            items,
            total_amount,
            coupon,
            shipping_address,
            account_id,
        } = request;
        let items = items.into_iter().map(CartLine::normalize).collect::<Result<Vec<LineItem>, _>>()?;
        if total_amount.is_negative() {
            return Err(ReconcileError::InvalidAmount(format!("Order total cannot be negative ({total_amount})")));
        }

        let sig = PaymentSignature::new(&gateway_order_id, &payment_id, &signature);
        if !self.verifier.verify(&sig) {
            warn!("💳️ Rejected payment {payment_id} for gateway order {gateway_order_id}. The signature is invalid.");
            return Err(ReconcileError::InvalidSignature);
        }

        let payment = within(
            self.options.gateway_timeout,
            "Gateway payment lookup",
            self.gateway.fetch_payment(&payment_id),
        )
        .await??;
        if !payment.status.is_captured() {
            info!("💳️ Payment {payment_id} is {} at the gateway, not captured.", payment.status);
            return Err(ReconcileError::PaymentNotCaptured(payment.status.to_string()));
        }

        let existing = within(
            self.options.storage_timeout,
            "Order lookup",
            self.db.fetch_order_by_payment_id(&payment_id),
        )
        .await??;
        if let Some(order) = existing {
            debug!("💳️ Payment {payment_id} was already reconciled as order #{}", order.id);
            return Ok(ReconcileOutcome::AlreadyProcessed(order));
        }

        let Some(shipping_address) = self.resolve_address(shipping_address, account_id).await? else {
            let pending = NewPendingPayment {
                account_id,
                gateway_order_id,
                gateway_payment_id: payment_id,
                signature,
                cart_snapshot: items,
                total_amount,
                coupon,
                expires_at: Utc::now() + self.options.pending_payment_ttl,
            };
            let pending = self.defer(pending).await?;
            return Ok(ReconcileOutcome::NeedsAddress(pending));
        };

        if self.options.price_policy == PricePolicy::Revalidate {
            self.check_catalog_prices(&items).await?;
        }

        let new_order = NewOrder {
            account_id,
            items,
            total_amount,
            currency: self.options.currency.clone(),
            gateway_order_id,
            gateway_payment_id: payment_id,
            gateway_signature: signature,
            shipping_address,
            coupon,
        };
        let inserted =
            within(self.options.storage_timeout, "Order insert", self.db.insert_paid_order(new_order)).await??;
        let order = match inserted {
            InsertOrderResult::Inserted(order) => order,
            InsertOrderResult::AlreadyExists(order) => {
                info!("💳️ A concurrent request already stored order #{} for this payment", order.id);
                return Ok(ReconcileOutcome::AlreadyProcessed(order));
            },
        };
        info!(
            "💳️ Order #{} created for payment {} ({}) on account {:?}",
            order.id, order.gateway_payment_id, order.total_amount, order.account_id
        );
        self.producers.order_created(OrderCreatedEvent::new(order.clone())).await;

        let mut report = FollowUpReport { stock_failures: self.take_stock(&order).await, ..Default::default() };
        if let Some(account_id) = order.account_id {
            match within(self.options.storage_timeout, "Cart clearing", self.db.clear_cart(account_id)).await {
                Ok(Ok(n)) => {
                    trace!("💳️ Removed {n} items from the cart of account #{account_id}");
                    report.cart_cleared = true;
                },
                Ok(Err(e)) => {
                    warn!("💳️ Order #{} is stored but the cart of account #{account_id} was not cleared. {e}", order.id);
                    report.cart_error = Some(e.to_string());
                },
                Err(e) => {
                    warn!("💳️ Order #{} is stored but the cart of account #{account_id} was not cleared. {e}", order.id);
                    report.cart_error = Some(e.to_string());
                },
            }
        }
        Ok(ReconcileOutcome::Created { order, report })
    }

    /// Completes a parked payment once an address is known.
    ///
    /// Only the account that made the payment may resume it. If `shipping_address` is `None`, the account's saved
    /// addresses are tried again, so a customer can also add an address to their profile and then resume.
    pub async fn resume_pending_payment(
        &self,
        gateway_order_id: &str,
        account_id: Option<i64>,
        shipping_address: Option<ShippingAddress>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let pending = self.fetch_pending(gateway_order_id, account_id).await?;
        if pending.status == PendingPaymentStatus::Completed {
            let order = within(
                self.options.storage_timeout,
                "Order lookup",
                self.db.fetch_order_by_payment_id(&pending.gateway_payment_id),
            )
            .await??;
            return order
                .map(ReconcileOutcome::AlreadyProcessed)
                .ok_or_else(|| ReconcileError::PendingPaymentNotFound(gateway_order_id.to_string()));
        }
        debug!("💳️ Resuming pending payment {} for gateway order {gateway_order_id}", pending.gateway_payment_id);
        let request = ReconcileRequest {
            payment_id: pending.gateway_payment_id,
            gateway_order_id: pending.gateway_order_id,
            signature: pending.signature,
            items: pending.cart_snapshot.into_iter().map(CartLine::from).collect(),
            total_amount: pending.total_amount,
            coupon: pending.coupon,
            shipping_address,
            account_id: pending.account_id,
        };
        self.reconcile(request).await
    }

    async fn fetch_pending(
        &self,
        gateway_order_id: &str,
        account_id: Option<i64>,
    ) -> Result<PendingPayment, ReconcileError> {
        let pending = within(
            self.options.storage_timeout,
            "Pending payment lookup",
            self.db.fetch_pending_payment(gateway_order_id, Utc::now()),
        )
        .await??
        .ok_or_else(|| ReconcileError::PendingPaymentNotFound(gateway_order_id.to_string()))?;
        if !pending.is_owned_by(account_id) {
            warn!("💳️ Account {account_id:?} tried to access the pending payment for {gateway_order_id}");
            return Err(ReconcileError::Forbidden);
        }
        Ok(pending)
    }

    /// A complete explicit address wins. An incomplete one is ignored, and the first complete saved address of the
    /// account is used instead.
    async fn resolve_address(
        &self,
        explicit: Option<ShippingAddress>,
        account_id: Option<i64>,
    ) -> Result<Option<ShippingAddress>, ReconcileError> {
        match explicit {
            Some(address) if address.is_complete() => return Ok(Some(address)),
            Some(_) => debug!("💳️ The address sent with the payment is incomplete. Looking for a saved address."),
            None => {},
        }
        let Some(account_id) = account_id else {
            return Ok(None);
        };
        let saved =
            within(self.options.storage_timeout, "Address lookup", self.db.fetch_addresses(account_id)).await??;
        Ok(saved.into_iter().find(ShippingAddress::is_complete))
    }

    async fn defer(&self, pending: NewPendingPayment) -> Result<PendingPayment, ReconcileError> {
        let pending =
            within(self.options.storage_timeout, "Pending payment upsert", self.db.upsert_pending_payment(pending))
                .await??;
        info!(
            "💳️ Payment {} is captured but there is no shipping address. Parked until {}",
            pending.gateway_payment_id, pending.expires_at
        );
        self.producers.payment_deferred(PaymentDeferredEvent::new(pending.clone())).await;
        Ok(pending)
    }

    async fn check_catalog_prices(&self, items: &[LineItem]) -> Result<(), ReconcileError> {
        for item in items {
            let product =
                within(self.options.storage_timeout, "Catalog lookup", self.db.fetch_product(&item.product_id))
                    .await??
                    .ok_or_else(|| InventoryError::ProductNotFound(item.product_id.clone()))?;
            if product.price != item.unit_price {
                warn!("💳️ Cart price for {} is {} but the catalog says {}", item.product_id, item.unit_price, product.price);
                return Err(ReconcileError::PriceMismatch {
                    product_id: item.product_id.clone(),
                    catalog: product.price,
                    snapshot: item.unit_price,
                });
            }
        }
        Ok(())
    }

    /// Takes each line out of stock on its own. A failing line is logged and reported; the rest still go through.
    async fn take_stock(&self, order: &Order) -> Vec<StockAdjustmentFailure> {
        let mut failures = Vec::new();
        for item in &order.items {
            let result = within(
                self.options.storage_timeout,
                "Stock decrement",
                self.db.decrement_stock(&item.product_id, item.quantity),
            )
            .await
            .unwrap_or_else(|e| Err(InventoryError::DatabaseError(e.to_string())));
            match result {
                Ok(stock) => trace!("📦️ Order #{}: {} x {} taken. {stock} left", order.id, item.quantity, item.product_id),
                Err(e) => {
                    error!(
                        "📦️ Order #{}: could not take {} x {} out of stock. The order stands and needs a manual stock \
                         check. {e}",
                        order.id, item.quantity, item.product_id
                    );
                    failures.push(StockAdjustmentFailure::new(item, &e));
                },
            }
        }
        failures
    }
}
