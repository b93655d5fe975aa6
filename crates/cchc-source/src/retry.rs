//! Bounded retry with exponential back-off and jitter for dataset fetches.
//!
//! Only transient HTTP failures are retried. Parse and schema errors come
//! from the document itself, so a second download would fail the same way.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** request timeouts, connection failures and HTTP 5xx.
///
/// **Not retriable:** 4xx statuses, [`SourceError::Parse`],
/// [`SourceError::SchemaMismatch`] and [`SourceError::InvalidUrl`].
pub(crate) fn is_retriable(err: &SourceError) -> bool {
    match err {
        SourceError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SourceError::Parse { .. }
        | SourceError::SchemaMismatch { .. }
        | SourceError::InvalidUrl { .. } => false,
    }
}

/// Upper bound on any single back-off sleep.
const MAX_DELAY_MS: u64 = 10_000;

/// Sleep ceiling before retry number `retry` (1-based), before jitter.
///
/// With `backoff_base_ms = 500`:
///
/// | Retry | Ceiling  |
/// |-------|----------|
/// | 1     | 500 ms   |
/// | 2     | 1 000 ms |
/// | 3     | 2 000 ms |
/// | 6+    | 10 000 ms (cap) |
fn backoff_ceiling_ms(retry: u32, backoff_base_ms: u64) -> u64 {
    let exponent = retry.saturating_sub(1).min(10);
    backoff_base_ms
        .saturating_mul(1u64 << exponent)
        .min(MAX_DELAY_MS)
}

/// Scales `ceiling_ms` by a uniform factor in `[0.75, 1.25)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn with_jitter(ceiling_ms: u64) -> Duration {
    let factor = 0.75 + rand::random::<f64>() * 0.5;
    Duration::from_millis((ceiling_ms as f64 * factor) as u64)
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
///
/// The default configuration allows a single retry, so a dataset fetch is
/// attempted at most twice before the error reaches the caller. Errors that
/// [`is_retriable`] rejects are returned from the first attempt.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if retry < max_retries && is_retriable(&err) => err,
            Err(err) => return Err(err),
        };
        retry += 1;
        let delay = with_jitter(backoff_ceiling_ms(retry, backoff_base_ms));
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "dataset fetch failed, retrying after back-off"
        );
        tokio::time::sleep(delay).await;
    }
}
