use chrono::{DateTime, Utc};

use crate::{
    db_types::{NewPendingPayment, PendingPayment},
    traits::StoreError,
};

/// Storage for captured payments that could not be turned into orders yet.
///
/// Records are keyed by gateway order id. They are never deleted while still `completed`, so that a late retry of the
/// same payment can be recognised.
#[allow(async_fn_in_trait)]
pub trait PendingPaymentManagement {
    /// Creates the pending payment, or refreshes an existing `pending` record for the same gateway order. Refreshing
    /// resets the expiry. A record that has already been completed is left untouched and returned as is.
    async fn upsert_pending_payment(&self, pending: NewPendingPayment) -> Result<PendingPayment, StoreError>;

    /// Fetches the pending payment for the gateway order. A `pending` record whose expiry lies before `now` is treated
    /// as if it did not exist.
    async fn fetch_pending_payment(
        &self,
        gateway_order_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingPayment>, StoreError>;

    /// Marks the pending payment as completed. Returns `true` if a record changed state.
    async fn mark_pending_payment_completed(&self, gateway_order_id: &str) -> Result<bool, StoreError>;

    /// Deletes expired `pending` records. Completed records are kept. Returns the number of records removed.
    async fn sweep_expired_pending_payments(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
