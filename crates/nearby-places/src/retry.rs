//! Back-off for Nearby Search calls.
//!
//! Only failures Google or the network can plausibly recover from are
//! retried. The client defaults to zero retries, so a failure normally
//! surfaces on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

/// Envelope statuses Google documents as transient.
const RETRIABLE_STATUSES: &[&str] = &["UNKNOWN_ERROR", "OVER_QUERY_LIMIT"];

/// Timeouts, refused connections, 5xx responses and [`RETRIABLE_STATUSES`].
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Api { status, .. } => RETRIABLE_STATUSES.contains(&status.as_str()),
        PlacesError::Http(e) => {
            let server_side = e.status().is_some_and(|s| s.is_server_error());
            server_side || e.is_timeout() || e.is_connect()
        }
        PlacesError::Deserialize { .. }
        | PlacesError::InvalidDay(_)
        | PlacesError::MissingApiKey
        | PlacesError::InvalidBaseUrl { .. } => false,
    }
}

/// Ceiling for a single back-off delay before jitter.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Delay before the `retry`-th retry (1-based), jittered by ±25 %.
///
/// | retry | base 500 ms | base 2 000 ms |
/// |------:|------------:|--------------:|
/// | 1     | 500 ms      | 2 s           |
/// | 2     | 1 s         | 4 s           |
/// | 3     | 2 s         | 8 s           |
/// | 6     | 16 s        | 60 s (cap)    |
fn backoff_delay(backoff_base_ms: u64, retry: u32) -> Duration {
    let doubled = backoff_base_ms.saturating_mul(2u64.saturating_pow(retry.saturating_sub(1)));
    let nominal = Duration::from_millis(doubled).min(MAX_BACKOFF);
    nominal.mul_f64(rand::random_range(0.75..=1.25))
}

/// Runs `operation`, retrying transient failures up to `max_retries` times
/// with [`backoff_delay`] between attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry == max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retry += 1;
        let delay = backoff_delay(backoff_base_ms, retry);
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = delay.as_millis(),
            error = %err,
            "places: search request failed transiently; backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn api_err(status: &str) -> PlacesError {
        PlacesError::Api {
            status: status.to_owned(),
            message: String::new(),
        }
    }

    #[test]
    fn transient_statuses_are_retriable() {
        assert!(is_retriable(&api_err("UNKNOWN_ERROR")));
        assert!(is_retriable(&api_err("OVER_QUERY_LIMIT")));
    }

    #[test]
    fn request_denied_is_not_retriable() {
        assert!(!is_retriable(&api_err("REQUEST_DENIED")));
        assert!(!is_retriable(&api_err("INVALID_REQUEST")));
    }

    #[test]
    fn local_errors_are_not_retriable() {
        assert!(!is_retriable(&PlacesError::MissingApiKey));
        assert!(!is_retriable(&PlacesError::InvalidDay(9)));
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        assert!(!is_retriable(&PlacesError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }));
    }

    #[test]
    fn backoff_doubles_within_jitter_bounds() {
        for (retry, nominal_ms) in [(1, 1000), (2, 2000), (4, 8000)] {
            let delay = backoff_delay(1000, retry);
            assert!(
                delay >= Duration::from_millis(nominal_ms * 3 / 4)
                    && delay <= Duration::from_millis(nominal_ms * 5 / 4),
                "retry {retry}: {delay:?}"
            );
        }
    }

    #[test]
    fn backoff_is_capped_at_a_minute_before_jitter() {
        let delay = backoff_delay(1000, 40);
        assert!(delay <= Duration::from_secs(75), "{delay:?}");
        assert!(delay >= Duration::from_secs(45), "{delay:?}");
        assert_eq!(backoff_delay(0, 3), Duration::ZERO);
    }

    #[tokio::test]
    async fn zero_retries_returns_first_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(0, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(api_err("UNKNOWN_ERROR"))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(PlacesError::Api { .. })));
    }

    #[tokio::test]
    async fn recovers_after_over_query_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err::<u32, _>(api_err("OVER_QUERY_LIMIT"))
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_request_denied() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(api_err("REQUEST_DENIED"))
            }
        })
        .await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "REQUEST_DENIED must not be retried"
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(api_err("UNKNOWN_ERROR"))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(result.is_err());
    }
}
