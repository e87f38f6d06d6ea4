use std::time::Duration;

use checkout_engine::{PendingPaymentApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the pending payment sweep. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Expired pending payments are already invisible to readers. The sweep only reclaims the rows.
pub fn start_expiry_worker(db: SqliteDatabase, storage_timeout: Duration, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = PendingPaymentApi::new(db).with_storage_timeout(storage_timeout);
        info!("🕰️ Pending payment sweep started. Running every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            debug!("🕰️ Running pending payment sweep");
            match api.sweep_expired().await {
                Ok(0) => trace!("🕰️ No expired pending payments"),
                Ok(n) => info!("🕰️ {n} expired pending payments removed"),
                Err(e) => error!("🕰️ Error running the pending payment sweep: {e}"),
            }
        }
    })
}
