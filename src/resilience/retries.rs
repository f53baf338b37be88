//! Retry logic for idempotent service reads.

use std::future::Future;

use crate::config::schema::RetryConfig;
use crate::ledger::types::LedgerResult;
use crate::resilience::backoff::backoff_delay;

/// Run `call` until it succeeds, fails permanently, or attempts run out.
///
/// Only errors reported as transient by [`crate::ledger::types::LedgerError::is_transient`] are retried.
pub async fn retry_idempotent<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut call: F,
) -> LedgerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LedgerResult<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = backoff_delay(attempt, config);
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
