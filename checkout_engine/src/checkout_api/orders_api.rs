use std::{fmt::Debug, time::Duration};

use log::*;

use crate::{
    checkout_api::{
        bounded::within,
        errors::OrdersApiError,
        order_objects::{OrderQueryFilter, DEFAULT_PAGE_SIZE},
    },
    db_types::{FulfillmentStatus, Order},
    traits::{OrderManagement, OrderPage},
};

/// Read access to orders, for their owners and for admins.
pub struct OrdersApi<B> {
    db: B,
    storage_timeout: Duration,
}

impl<B> Debug for OrdersApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrdersApi")
    }
}

impl<B> OrdersApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, storage_timeout: Duration::from_secs(5) }
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }
}

impl<B> OrdersApi<B>
where B: OrderManagement
{
    /// A page of the account's own orders, newest first.
    pub async fn orders_for_account(
        &self,
        account_id: i64,
        status: Option<FulfillmentStatus>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<OrderPage, OrdersApiError> {
        let query = OrderQueryFilter { account_id: Some(account_id), status, page, limit };
        self.search(query).await
    }

    /// Looks up an order, but only if it belongs to `account_id`. Someone else's order looks exactly like a missing one.
    pub async fn order_for_account(&self, order_id: i64, account_id: i64) -> Result<Option<Order>, OrdersApiError> {
        let order = self.order_by_id(order_id).await?;
        Ok(order.filter(|o| o.is_owned_by(account_id)))
    }

    pub async fn order_by_id(&self, order_id: i64) -> Result<Option<Order>, OrdersApiError> {
        let order = within(self.storage_timeout, "Order lookup", self.db.fetch_order(order_id)).await??;
        Ok(order)
    }

    /// Every order in the store, ten to a page.
    pub async fn all_orders(
        &self,
        status: Option<FulfillmentStatus>,
        page: Option<u32>,
    ) -> Result<OrderPage, OrdersApiError> {
        let query = OrderQueryFilter { account_id: None, status, page, limit: Some(DEFAULT_PAGE_SIZE) };
        self.search(query).await
    }

    async fn search(&self, query: OrderQueryFilter) -> Result<OrderPage, OrdersApiError> {
        trace!("📋️ Searching orders. {query}");
        let page = within(self.storage_timeout, "Order search", self.db.search_orders(query)).await??;
        Ok(page)
    }
}
