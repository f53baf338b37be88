//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::schema::RetryConfig;

/// Delay before retry number `attempt` (1-based); zero for attempt 0.
pub fn backoff_delay(attempt: u32, config: &RetryConfig) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
    let capped = config
        .base_delay_ms
        .saturating_mul(factor)
        .min(config.max_delay_ms);

    // Up to 10% extra so parallel waiters spread out.
    let spread = capped / 10;
    let jitter = if spread > 0 {
        rand::thread_rng().gen_range(0..=spread)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}
