use thiserror::Error;

use crate::db_types::{Product, ProductId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("Insufficient stock for {product_id}. {available} available, {requested} requested")]
    InsufficientStock { product_id: ProductId, available: i64, requested: i64 },
    #[error("Invalid quantity {0}. Quantities must be positive")]
    InvalidQuantity(i64),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        InventoryError::DatabaseError(e.to_string())
    }
}

/// The stock ledger.
///
/// Every adjustment is a single conditional write, so concurrent decrements can never take a product below zero.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement {
    async fn fetch_product(&self, product_id: &ProductId) -> Result<Option<Product>, InventoryError>;

    /// Takes `quantity` units out of stock and returns the new stock level. The ledger is unchanged on failure.
    async fn decrement_stock(&self, product_id: &ProductId, quantity: i64) -> Result<i64, InventoryError>;

    /// Returns `quantity` units to stock and returns the new stock level.
    async fn increment_stock(&self, product_id: &ProductId, quantity: i64) -> Result<i64, InventoryError>;
}
