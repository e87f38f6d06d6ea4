use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Account, CartItem, ProductId, Role, ShippingAddress};

pub async fn create_account(
    email: &str,
    full_name: &str,
    role: Role,
    conn: &mut SqliteConnection,
) -> Result<Account, sqlx::Error> {
    let account: Account =
        sqlx::query_as("INSERT INTO accounts (email, full_name, role) VALUES ($1, $2, $3) RETURNING *")
            .bind(email)
            .bind(full_name)
            .bind(role)
            .fetch_one(conn)
            .await?;
    debug!("🧑️ Account #{} created for {email}", account.id);
    Ok(account)
}

pub async fn add_address(
    account_id: i64,
    address: &ShippingAddress,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO addresses (account_id, address_line1, address_line2, city, state, pincode, country, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id;
        "#,
    )
    .bind(account_id)
    .bind(address.address_line1.as_str())
    .bind(address.address_line2.as_deref())
    .bind(address.city.as_str())
    .bind(address.state.as_deref())
    .bind(address.pincode.as_str())
    .bind(address.country.as_str())
    .bind(address.phone.as_deref())
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Saved addresses in insertion order.
pub async fn fetch_addresses(account_id: i64, conn: &mut SqliteConnection) -> Result<Vec<ShippingAddress>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM addresses WHERE account_id = $1 ORDER BY id").bind(account_id).fetch_all(conn).await
}

pub async fn set_cart_item(
    account_id: i64,
    product_id: &ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO cart_items (account_id, product_id, quantity) VALUES ($1, $2, $3) ON CONFLICT (account_id, \
         product_id) DO UPDATE SET quantity = excluded.quantity",
    )
    .bind(account_id)
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_cart(account_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartItem>, sqlx::Error> {
    sqlx::query_as("SELECT product_id, quantity FROM cart_items WHERE account_id = $1 ORDER BY product_id")
        .bind(account_id)
        .fetch_all(conn)
        .await
}

pub async fn clear_cart(account_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE account_id = $1").bind(account_id).execute(conn).await?;
    Ok(result.rows_affected())
}
