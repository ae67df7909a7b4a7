use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::warn;

use crate::ApiError;

pub const RETRY_INITIAL_DELAY_MS: u64 = 1000;
pub const RETRY_BACKOFF_FACTOR: u64 = 2;
pub const RETRY_MAX_DELAY_MS: u64 = 30_000;

/// Bounds for rate-limit retries. Only rate-limited responses are retried;
/// every other error propagates on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_factor: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: RETRY_INITIAL_DELAY_MS,
            backoff_factor: RETRY_BACKOFF_FACTOR,
            max_delay_ms: RETRY_MAX_DELAY_MS,
        }
    }
}

/// Run `f`, retrying rate-limited failures with backoff until the attempt
/// budget is exhausted. A server-provided delay hint wins over the computed
/// backoff.
pub(crate) async fn with_retry<F, Fut, T>(config: &RetryConfig, mut f: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if attempt >= config.max_attempts {
                    return Err(e);
                }
                let ApiError::RateLimited {
                    message,
                    retry_after_ms,
                } = &e
                else {
                    return Err(e);
                };

                let delay_ms = retry_after_ms
                    .unwrap_or_else(|| exponential_backoff(attempt, config))
                    .min(config.max_delay_ms);
                warn!(
                    attempt,
                    max = config.max_attempts,
                    delay_ms,
                    reason = %message,
                    "rate limited, retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

fn exponential_backoff(attempt: u32, config: &RetryConfig) -> u64 {
    let exp = config.backoff_factor.saturating_pow(attempt.saturating_sub(1));
    config
        .initial_delay_ms
        .saturating_mul(exp)
        .min(config.max_delay_ms)
}

/// Millisecond delay requested by rate-limit response headers.
///
/// Priority: `retry-after` (seconds or HTTP-date), then `x-ratelimit-reset`
/// (epoch seconds).
pub(crate) fn retry_after_hint(headers: &HeaderMap) -> Option<u64> {
    if let Some(val) = headers.get("retry-after").and_then(|v| v.to_str().ok()) {
        if let Ok(secs) = val.parse::<f64>() {
            if secs.is_finite() && secs >= 0.0 {
                return Some((secs * 1000.0).ceil() as u64);
            }
        }
        if let Ok(date) = chrono::DateTime::parse_from_rfc2822(val) {
            let diff_ms = date.signed_duration_since(chrono::Utc::now()).num_milliseconds();
            if diff_ms > 0 {
                return Some(diff_ms as u64);
            }
        }
    }

    if let Some(val) = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
    {
        if let Ok(epoch) = val.parse::<i64>() {
            let diff_ms = (epoch - chrono::Utc::now().timestamp()).saturating_mul(1000);
            if diff_ms > 0 {
                return Some(diff_ms as u64);
            }
        }
    }

    None
}
