//! Retry with exponential backoff for transient ERP failures.
//!
//! Retriable: 429 responses, 5xx responses and network-level failures.
//! Everything else (404, other 4xx, bad JSON, normalization) is returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ErpError;

fn is_retriable(err: &ErpError) -> bool {
    match err {
        ErpError::RateLimited { .. } | ErpError::Http(_) => true,
        ErpError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// The wait before the n-th retry is `backoff_base_secs * 2^(n-1)` seconds.
/// With `max_retries = 3` the operation is attempted at most 4 times total.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ErpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ErpError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient ERP error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
