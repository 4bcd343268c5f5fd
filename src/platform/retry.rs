// Caller-side backoff for rate-limited platform calls
// The client itself never retries; engine components wrap individual
// round trips with this bounded policy.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::platform::error::PlatformError;

/// Total attempts per call, including the first
const MAX_ATTEMPTS: u32 = 3;

/// Linear backoff step between attempts
const BASE_DELAY_MS: u64 = 200;

/// Upper bound of the random jitter added to each delay
const JITTER_MS: u64 = 150;

/// Run a platform call, retrying only on `RateLimited`
///
/// All other errors pass through on the first occurrence; after
/// `MAX_ATTEMPTS` rate-limited attempts the last error is surfaced.
pub async fn with_rate_limit_retry<T, F, Fut>(mut call: F) -> Result<T, PlatformError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                let jitter = rand::thread_rng().gen_range(0..JITTER_MS);
                let delay = Duration::from_millis(BASE_DELAY_MS * u64::from(attempt) + jitter);
                tracing::debug!("rate limited, retrying in {:?} (attempt {})", delay, attempt);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
