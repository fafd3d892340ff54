//! Deadlines for store calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use docket_core::Result;
use docket_core::error::StoreError;

/// Run a store call, failing with [`StoreError::Timeout`] once `limit`
/// passes. Timeouts are not retried.
pub(crate) async fn bounded<T>(
    operation: &'static str,
    limit: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            let duration_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            warn!(operation, duration_ms, "store call timed out");
            Err(StoreError::Timeout {
                operation,
                duration_ms,
            }
            .into())
        }
    }
}
