use checkout_engine::{
    db_types::{FulfillmentStatus, NewOrder, NewPendingPayment, Order, PendingPayment},
    order_objects::OrderQueryFilter,
    InsertOrderResult,
    OrderManagement,
    OrderPage,
    PendingPaymentManagement,
    StoreError,
};
use chrono::{DateTime, Utc};
use mockall::mock;

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn fetch_order(&self, id: i64) -> Result<Option<Order>, StoreError>;
        async fn fetch_order_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>, StoreError>;
        async fn insert_paid_order(&self, order: NewOrder) -> Result<InsertOrderResult, StoreError>;
        async fn update_fulfillment_status(&self, id: i64, expected: FulfillmentStatus, new_status: FulfillmentStatus) -> Result<Option<Order>, StoreError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<OrderPage, StoreError>;
    }
}

mock! {
    pub PendingPaymentManager {}
    impl PendingPaymentManagement for PendingPaymentManager {
        async fn upsert_pending_payment(&self, pending: NewPendingPayment) -> Result<PendingPayment, StoreError>;
        async fn fetch_pending_payment(&self, gateway_order_id: &str, now: DateTime<Utc>) -> Result<Option<PendingPayment>, StoreError>;
        async fn mark_pending_payment_completed(&self, gateway_order_id: &str) -> Result<bool, StoreError>;
        async fn sweep_expired_pending_payments(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
    }
}
