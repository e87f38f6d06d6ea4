use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{NewPendingPayment, PendingPayment, PendingPaymentStatus},
    traits::StoreError,
};

/// Creates or refreshes the pending payment for a gateway order. Records that are already completed are never
/// overwritten; the stored record is returned instead.
pub async fn upsert(pending: &NewPendingPayment, conn: &mut SqliteConnection) -> Result<PendingPayment, StoreError> {
    let updated: Option<PendingPayment> = sqlx::query_as(
        r#"
            INSERT INTO pending_payments (
                account_id,
                gateway_order_id,
                gateway_payment_id,
                signature,
                cart_snapshot,
                total_amount,
                coupon,
                status,
                expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8)
            ON CONFLICT (gateway_order_id) DO UPDATE SET
                account_id = excluded.account_id,
                gateway_payment_id = excluded.gateway_payment_id,
                signature = excluded.signature,
                cart_snapshot = excluded.cart_snapshot,
                total_amount = excluded.total_amount,
                coupon = excluded.coupon,
                status = 'pending',
                expires_at = excluded.expires_at,
                updated_at = CURRENT_TIMESTAMP
            WHERE pending_payments.status <> 'completed'
            RETURNING *;
        "#,
    )
    .bind(pending.account_id)
    .bind(pending.gateway_order_id.as_str())
    .bind(pending.gateway_payment_id.as_str())
    .bind(pending.signature.as_str())
    .bind(Json(&pending.cart_snapshot))
    .bind(pending.total_amount)
    .bind(pending.coupon.as_ref().map(Json))
    .bind(pending.expires_at)
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(p) => {
            debug!("🕰️ Pending payment for gateway order {} saved. Expires {}", p.gateway_order_id, p.expires_at);
            Ok(p)
        },
        None => {
            debug!("🕰️ Pending payment for gateway order {} is already completed", pending.gateway_order_id);
            let existing = fetch(&pending.gateway_order_id, conn).await?;
            existing.ok_or_else(|| StoreError::DatabaseError("Pending payment vanished during upsert".into()))
        },
    }
}

/// Fetches the raw record, without any expiry logic.
pub async fn fetch(gateway_order_id: &str, conn: &mut SqliteConnection) -> Result<Option<PendingPayment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM pending_payments WHERE gateway_order_id = $1")
        .bind(gateway_order_id)
        .fetch_optional(conn)
        .await
}

/// Fetches the record, hiding `pending` records that have outlived their expiry.
pub async fn fetch_live(
    gateway_order_id: &str,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<PendingPayment>, sqlx::Error> {
    let pending = fetch(gateway_order_id, conn).await?;
    Ok(pending.filter(|p| !(p.status == PendingPaymentStatus::Pending && p.is_expired(now))))
}

pub async fn mark_completed(gateway_order_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE pending_payments SET status = 'completed', updated_at = CURRENT_TIMESTAMP WHERE gateway_order_id = \
         $1 AND status = 'pending'",
    )
    .bind(gateway_order_id)
    .execute(conn)
    .await?;
    trace!("🕰️ Pending payment for gateway order {gateway_order_id} completed: {}", result.rows_affected() > 0);
    Ok(result.rows_affected() > 0)
}

pub async fn delete_expired(now: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM pending_payments WHERE status <> 'completed' AND julianday(expires_at) <= julianday($1)",
    )
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
