//! Retry with exponential backoff for classifier HTTP calls.
//!
//! Only transport failures are retried. Status codes are the caller's
//! concern, and timeouts are not retried because the outer deadline would
//! expire first.

use std::future::Future;
use std::time::Duration;

/// Delay before the first retry; doubles after each attempt.
pub(crate) const BASE_DELAY: Duration = Duration::from_millis(200);

/// Call `f` up to `max_retries + 1` times until it yields a response.
pub(crate) async fn retry_send<F, Fut>(
    max_retries: u32,
    base_delay: Duration,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..max_retries {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) if e.is_timeout() => return Err(e),
            Err(e) => {
                let delay = base_delay * 2u32.saturating_pow(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries,
                    "classifier request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    f().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn retry_exhausts_all_attempts_on_connection_refused() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_send(2, Duration::from_millis(1), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                reqwest::Client::new().get("http://127.0.0.1:1/").send().await
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
