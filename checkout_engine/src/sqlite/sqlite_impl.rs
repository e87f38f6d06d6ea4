//! `SqliteDatabase` is a concrete implementation of a checkout engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
use std::fmt::Debug;

use checkout_common::Paise;
use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{accounts, db_url, inventory, new_pool, orders, pending_payments};
use crate::{
    checkout_api::order_objects::OrderQueryFilter,
    db_types::{
        Account,
        CartItem,
        FulfillmentStatus,
        NewOrder,
        NewPendingPayment,
        Order,
        PendingPayment,
        Product,
        ProductId,
        Role,
        ShippingAddress,
    },
    traits::{
        AccountDirectory,
        CheckoutDatabase,
        InsertOrderResult,
        InventoryError,
        InventoryManagement,
        OrderManagement,
        OrderPage,
        PendingPaymentManagement,
        StoreError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_payment_id(payment_id, &mut conn).await?;
        Ok(order)
    }

    async fn insert_paid_order(&self, order: NewOrder) -> Result<InsertOrderResult, StoreError> {
        let mut tx = self.pool.begin().await?;
        match orders::insert_order(&order, &mut tx).await {
            Ok(inserted) => {
                let completed = pending_payments::mark_completed(&order.gateway_order_id, &mut tx).await?;
                tx.commit().await?;
                if completed {
                    debug!("🗃️ Pending payment for {} closed by order #{}", order.gateway_order_id, inserted.id);
                }
                Ok(InsertOrderResult::Inserted(inserted))
            },
            Err(StoreError::DuplicatePayment(payment_id)) => {
                tx.rollback().await?;
                let mut conn = self.pool.acquire().await?;
                let existing = orders::fetch_order_by_payment_id(&payment_id, &mut conn)
                    .await?
                    .ok_or_else(|| StoreError::DuplicatePayment(payment_id.clone()))?;
                debug!("🗃️ Lost the race to store payment {payment_id}. Order #{} already exists", existing.id);
                Ok(InsertOrderResult::AlreadyExists(existing))
            },
            Err(e) => Err(e),
        }
    }

    async fn update_fulfillment_status(
        &self,
        id: i64,
        expected: FulfillmentStatus,
        new_status: FulfillmentStatus,
    ) -> Result<Option<Order>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_status(id, expected, new_status, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<OrderPage, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let page = orders::search_orders(query, &mut conn).await?;
        Ok(page)
    }
}

impl PendingPaymentManagement for SqliteDatabase {
    async fn upsert_pending_payment(&self, pending: NewPendingPayment) -> Result<PendingPayment, StoreError> {
        let mut conn = self.pool.acquire().await?;
        pending_payments::upsert(&pending, &mut conn).await
    }

    async fn fetch_pending_payment(
        &self,
        gateway_order_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingPayment>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let pending = pending_payments::fetch_live(gateway_order_id, now, &mut conn).await?;
        Ok(pending)
    }

    async fn mark_pending_payment_completed(&self, gateway_order_id: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let changed = pending_payments::mark_completed(gateway_order_id, &mut conn).await?;
        Ok(changed)
    }

    async fn sweep_expired_pending_payments(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let removed = pending_payments::delete_expired(now, &mut conn).await?;
        Ok(removed)
    }
}

impl InventoryManagement for SqliteDatabase {
    async fn fetch_product(&self, product_id: &ProductId) -> Result<Option<Product>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let product = inventory::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn decrement_stock(&self, product_id: &ProductId, quantity: i64) -> Result<i64, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::decrement_stock(product_id, quantity, &mut conn).await
    }

    async fn increment_stock(&self, product_id: &ProductId, quantity: i64) -> Result<i64, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::increment_stock(product_id, quantity, &mut conn).await
    }
}

impl AccountDirectory for SqliteDatabase {
    async fn fetch_addresses(&self, account_id: i64) -> Result<Vec<ShippingAddress>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let addresses = accounts::fetch_addresses(account_id, &mut conn).await?;
        Ok(addresses)
    }

    async fn fetch_cart(&self, account_id: i64) -> Result<Vec<CartItem>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let cart = accounts::fetch_cart(account_id, &mut conn).await?;
        Ok(cart)
    }

    async fn clear_cart(&self, account_id: i64) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let removed = accounts::clear_cart(account_id, &mut conn).await?;
        Ok(removed)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn create_account(&self, email: &str, full_name: &str, role: Role) -> Result<Account, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let account = accounts::create_account(email, full_name, role, &mut conn).await?;
        Ok(account)
    }

    pub async fn add_address(&self, account_id: i64, address: &ShippingAddress) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let id = accounts::add_address(account_id, address, &mut conn).await?;
        Ok(id)
    }

    pub async fn set_cart_item(&self, account_id: i64, product_id: &ProductId, quantity: i64) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        accounts::set_cart_item(account_id, product_id, quantity, &mut conn).await?;
        Ok(())
    }

    pub async fn upsert_product(
        &self,
        product_id: &ProductId,
        name: &str,
        price: Paise,
        stock: i64,
    ) -> Result<Product, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::upsert_product(product_id, name, price, stock, &mut conn).await
    }
}
