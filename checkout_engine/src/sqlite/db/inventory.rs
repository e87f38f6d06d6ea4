use checkout_common::Paise;
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Product, ProductId},
    traits::InventoryError,
};

pub async fn fetch_product(
    product_id: &ProductId,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE product_id = $1").bind(product_id).fetch_optional(conn).await
}

/// Creates the product, or overwrites its name, price and stock level.
pub async fn upsert_product(
    product_id: &ProductId,
    name: &str,
    price: Paise,
    stock: i64,
    conn: &mut SqliteConnection,
) -> Result<Product, InventoryError> {
    if stock < 0 {
        return Err(InventoryError::InvalidQuantity(stock));
    }
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (product_id, name, price, stock) VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                stock = excluded.stock,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(product_id)
    .bind(name)
    .bind(price)
    .bind(stock)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

/// A single conditional update: the row only changes if enough stock is on hand, so the ledger can never go negative,
/// however many decrements race.
pub async fn decrement_stock(
    product_id: &ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<i64, InventoryError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(quantity));
    }
    let remaining: Option<i64> = sqlx::query_scalar(
        "UPDATE products SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP WHERE product_id = $2 AND stock >= \
         $1 RETURNING stock",
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(stock) = remaining {
        trace!("📦️ {product_id} stock reduced by {quantity} to {stock}");
        return Ok(stock);
    }
    let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE product_id = $1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    match available {
        Some(available) => {
            Err(InventoryError::InsufficientStock { product_id: product_id.clone(), available, requested: quantity })
        },
        None => Err(InventoryError::ProductNotFound(product_id.clone())),
    }
}

pub async fn increment_stock(
    product_id: &ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<i64, InventoryError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(quantity));
    }
    let stock: Option<i64> = sqlx::query_scalar(
        "UPDATE products SET stock = stock + $1, updated_at = CURRENT_TIMESTAMP WHERE product_id = $2 RETURNING stock",
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    let stock = stock.ok_or_else(|| InventoryError::ProductNotFound(product_id.clone()))?;
    trace!("📦️ {product_id} stock increased by {quantity} to {stock}");
    Ok(stock)
}
