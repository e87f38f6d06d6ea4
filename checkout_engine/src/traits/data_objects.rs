use serde::Serialize;
use thiserror::Error;

use crate::db_types::Order;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Could not serialize {0}")]
    SerializationError(String),
    #[error("An order for payment {0} already exists")]
    DuplicatePayment(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::SerializationError(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub enum InsertOrderResult {
    Inserted(Order),
    /// Another writer stored an order for the same payment first. The stored order is returned.
    AlreadyExists(Order),
}

/// A page of orders, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl OrderPage {
    pub fn new(orders: Vec<Order>, page: u32, limit: u32, total_items: u64) -> Self {
        let limit = u64::from(limit.max(1));
        let total_pages = total_items.div_ceil(limit);
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
        Self { orders, page, total_pages, total_items }
    }
}
