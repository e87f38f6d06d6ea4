use std::{future::Future, time::Duration};

use thiserror::Error;

#[derive(Debug, Clone, Copy, Error)]
#[error("{0} did not complete within {1:?}")]
pub struct TimedOut(pub &'static str, pub Duration);

/// Runs `fut`, giving up after `limit`. The caller sees the inner result wrapped in an outer timeout result, so the two
/// error kinds can be converted separately with `??`.
pub(crate) async fn within<F: Future>(limit: Duration, what: &'static str, fut: F) -> Result<F::Output, TimedOut> {
    tokio::time::timeout(limit, fut).await.map_err(|_| TimedOut(what, limit))
}
