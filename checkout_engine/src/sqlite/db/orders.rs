use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    checkout_api::order_objects::OrderQueryFilter,
    db_types::{FulfillmentStatus, LineItem, NewOrder, Order, PaymentStatus},
    traits::{OrderPage, StoreError},
};

/// Inserts a paid order and its line items. This is not atomic. Embed the call in a transaction and pass `&mut *tx`
/// as the connection if the order and its items must land together.
///
/// A second order for the same gateway payment id is refused with [`StoreError::DuplicatePayment`].
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, StoreError> {
    let result = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (
                account_id,
                total_amount,
                currency,
                gateway_order_id,
                gateway_payment_id,
                gateway_signature,
                payment_status,
                status,
                shipping_address,
                coupon
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *;
        "#,
    )
    .bind(order.account_id)
    .bind(order.total_amount)
    .bind(order.currency.as_str())
    .bind(order.gateway_order_id.as_str())
    .bind(order.gateway_payment_id.as_str())
    .bind(order.gateway_signature.as_str())
    .bind(PaymentStatus::Paid)
    .bind(FulfillmentStatus::Processing)
    .bind(Json(&order.shipping_address))
    .bind(order.coupon.as_ref().map(Json))
    .fetch_one(&mut *conn)
    .await;
    let mut inserted = match result {
        Ok(o) => o,
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            debug!("📝️ Payment {} already has an order", order.gateway_payment_id);
            return Err(StoreError::DuplicatePayment(order.gateway_payment_id.clone()));
        },
        Err(e) => return Err(e.into()),
    };
    for item in &order.items {
        sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4)")
            .bind(inserted.id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *conn)
            .await?;
    }
    inserted.items = order.items.clone();
    debug!("📝️ Order #{} inserted for payment {}", inserted.id, inserted.gateway_payment_id);
    Ok(inserted)
}

async fn load_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<LineItem>, sqlx::Error> {
    sqlx::query_as("SELECT product_id, quantity, unit_price FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

async fn with_items(order: Option<Order>, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    match order {
        Some(mut order) => {
            order.items = load_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(&mut *conn).await?;
    with_items(order, conn).await
}

pub async fn fetch_order_by_payment_id(
    payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE gateway_payment_id = $1")
        .bind(payment_id)
        .fetch_optional(&mut *conn)
        .await?;
    with_items(order, conn).await
}

/// Compare-and-set on the fulfillment status. Returns `None` if the order does not exist or no longer has the
/// `expected` status.
pub async fn update_status(
    id: i64,
    expected: FulfillmentStatus,
    new_status: FulfillmentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3 RETURNING *",
    )
    .bind(new_status)
    .bind(id)
    .bind(expected)
    .fetch_optional(&mut *conn)
    .await?;
    trace!("📝️ Order #{id} status update {expected} -> {new_status}. Applied: {}", order.is_some());
    with_items(order, conn).await
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &OrderQueryFilter) {
    if query.is_empty() {
        return;
    }
    builder.push(" WHERE ");
    let mut where_clause = builder.separated(" AND ");
    if let Some(account_id) = query.account_id {
        where_clause.push("account_id = ");
        where_clause.push_bind_unseparated(account_id);
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
}

/// Fetches one page of orders matching the filter, newest first.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<OrderPage, sqlx::Error> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_filters(&mut count, &query);
    let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

    let mut builder = QueryBuilder::new("SELECT * FROM orders");
    push_filters(&mut builder, &query);
    builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    builder.push_bind(i64::from(query.limit()));
    builder.push(" OFFSET ");
    builder.push_bind(query.offset());
    trace!("📝️ Executing query: {}", builder.sql());
    let mut orders: Vec<Order> = builder.build_query_as().fetch_all(&mut *conn).await?;
    for order in orders.iter_mut() {
        order.items = load_items(order.id, conn).await?;
    }
    let total = u64::try_from(total).unwrap_or_default();
    Ok(OrderPage::new(orders, query.page(), query.limit(), total))
}
