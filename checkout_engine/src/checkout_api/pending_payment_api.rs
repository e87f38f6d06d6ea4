use std::{fmt::Debug, time::Duration};

use chrono::Utc;
use log::*;

use crate::{
    checkout_api::{bounded::within, errors::ReconcileError},
    db_types::PendingPayment,
    traits::PendingPaymentManagement,
};

/// Owner access to parked payments, and housekeeping of expired ones.
pub struct PendingPaymentApi<B> {
    db: B,
    storage_timeout: Duration,
}

impl<B> Debug for PendingPaymentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PendingPaymentApi")
    }
}

impl<B> PendingPaymentApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, storage_timeout: Duration::from_secs(5) }
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }
}

impl<B> PendingPaymentApi<B>
where B: PendingPaymentManagement
{
    /// Fetches the live pending payment for a gateway order, provided `account_id` owns it.
    pub async fn pending_payment_for_account(
        &self,
        gateway_order_id: &str,
        account_id: i64,
    ) -> Result<PendingPayment, ReconcileError> {
        let pending = within(
            self.storage_timeout,
            "Pending payment lookup",
            self.db.fetch_pending_payment(gateway_order_id, Utc::now()),
        )
        .await??
        .ok_or_else(|| ReconcileError::PendingPaymentNotFound(gateway_order_id.to_string()))?;
        if !pending.is_owned_by(Some(account_id)) {
            warn!("🕰️ Account #{account_id} asked for a pending payment it does not own ({gateway_order_id})");
            return Err(ReconcileError::Forbidden);
        }
        Ok(pending)
    }

    /// Deletes expired pending payments. Returns how many were removed.
    pub async fn sweep_expired(&self) -> Result<u64, ReconcileError> {
        let removed = within(
            self.storage_timeout,
            "Pending payment sweep",
            self.db.sweep_expired_pending_payments(Utc::now()),
        )
        .await??;
        if removed > 0 {
            info!("🕰️ Swept {removed} expired pending payments");
        }
        Ok(removed)
    }
}
