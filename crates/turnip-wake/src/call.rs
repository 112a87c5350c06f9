//! Deadline wrapper shared by every upstream read and write.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use turnip_core::{PortResult, WakeError, WakeResult};

/// Run one remote call under `timeout`. Expiry and port errors both
/// surface as `UpstreamUnavailable`. No retries.
pub(crate) async fn bounded<T, F>(operation: &'static str, timeout: Duration, call: F) -> WakeResult<T>
where
    F: Future<Output = PortResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(WakeError::from),
        Err(_) => {
            warn!(
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "upstream call timed out"
            );
            Err(WakeError::unavailable(
                operation,
                format!("timed out after {}ms", timeout.as_millis()),
            ))
        }
    }
}
