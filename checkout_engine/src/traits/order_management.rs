use crate::{
    checkout_api::order_objects::OrderQueryFilter,
    db_types::{FulfillmentStatus, NewOrder, Order},
    traits::{InsertOrderResult, OrderPage, StoreError},
};

/// The `OrderManagement` trait defines the behaviour for storing and querying orders in the database backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, StoreError>;

    /// Fetches the order created for the given gateway payment id, if any. There can be at most one.
    async fn fetch_order_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>, StoreError>;

    /// Stores a paid order and, in the same atomic transaction, marks any pending payment for the same gateway order as
    /// completed.
    ///
    /// If an order for the same gateway payment id already exists, nothing is written and the existing order is
    /// returned as [`InsertOrderResult::AlreadyExists`].
    async fn insert_paid_order(&self, order: NewOrder) -> Result<InsertOrderResult, StoreError>;

    /// Moves the order from `expected` to `new_status`. The write only happens if the order still has the `expected`
    /// status, so concurrent updates cannot both succeed. Returns `None` if the order was not in the expected state.
    async fn update_fulfillment_status(
        &self,
        id: i64,
        expected: FulfillmentStatus,
        new_status: FulfillmentStatus,
    ) -> Result<Option<Order>, StoreError>;

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<OrderPage, StoreError>;
}
