//! Resilient HTTP request utilities using retry and timeout middleware.
//!
//! Wraps HTTP GET requests with [`seatbelt`] retry and timeout middleware so that
//! transient network failures are masked automatically.

use core::time::Duration;
use layered::{Execute, Service, Stack};
use ohno::app_err;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;

const LOG_TARGET: &str = "      http";

/// Default timeout for a single request attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries (on top of the original request).
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay for exponential backoff between retries.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on a server-requested `Retry-After` delay.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// How requests are retried and bounded in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: u32, timeout: Duration) -> Self {
        Self {
            max_retries,
            base_delay: RETRY_BASE_DELAY,
            timeout,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry(timeout: Duration) -> Self {
        Self::new(0, timeout)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT)
    }
}

/// Parse the `Retry-After` header value as seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    let s = headers.get(RETRY_AFTER).and_then(|h| h.to_str().ok())?;
    s.trim().parse::<u64>().ok()
}

/// Whether a result should be retried, and after how long.
#[derive(Debug, PartialEq, Eq)]
enum Recovery {
    Never,
    Retry(Option<Duration>),
}

impl From<Recovery> for RecoveryInfo {
    fn from(recovery: Recovery) -> Self {
        match recovery {
            Recovery::Never => Self::never(),
            Recovery::Retry(None) => Self::retry(),
            Recovery::Retry(Some(delay)) => Self::retry().delay(delay.min(MAX_RETRY_DELAY)),
        }
    }
}

/// Classify an HTTP response for retry purposes.
fn should_retry_response(result: &crate::Result<reqwest::Response>) -> Recovery {
    match result {
        // Network / connection errors are always transient.
        Err(_) => Recovery::Retry(None),
        Ok(resp) => classify_status(resp.status(), resp.headers()),
    }
}

fn classify_status(status: StatusCode, headers: &HeaderMap) -> Recovery {
    // Server errors (5xx) are transient.
    if status.is_server_error() {
        return Recovery::Retry(None);
    }

    // Rate-limited (429): honor Retry-After if present, otherwise default to 5s.
    if status == StatusCode::TOO_MANY_REQUESTS {
        let delay = parse_retry_after(headers).unwrap_or(5);
        return Recovery::Retry(Some(Duration::from_secs(delay)));
    }

    // Secondary rate limit (403 with Retry-After): wait the requested duration and retry.
    if status == StatusCode::FORBIDDEN {
        return parse_retry_after(headers).map_or(Recovery::Never, |delay| Recovery::Retry(Some(Duration::from_secs(delay))));
    }

    // Everything else (success, 4xx client errors) is not retried.
    Recovery::Never
}

/// Send an HTTP GET request with automatic retry and timeout.
///
/// Retries on network errors, timeouts, 5xx, and 429 responses with exponential backoff, up to
/// `policy.max_retries` times. Each attempt is bounded by `policy.timeout`. The last response
/// (or error) is returned once retries are exhausted, so callers still see the final status code.
pub async fn resilient_get(client: &reqwest::Client, url: &str, policy: &RetryPolicy) -> crate::Result<reqwest::Response> {
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name("http_get");

    let client = client.clone();
    let timeout = policy.timeout;
    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &crate::Result<reqwest::Response>, _| should_retry_response(result).into())
            .max_retry_attempts(policy.max_retries)
            .base_delay(policy.base_delay)
            .backoff(Backoff::Exponential)
            .on_retry(|_output, args| {
                log::debug!(
                    target: LOG_TARGET,
                    "retrying HTTP GET (attempt {}, delay {}ms)",
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis(),
                );
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(move |_| app_err!("HTTP request timed out after {}s", timeout.as_secs()))
            .timeout(timeout),
        Execute::new(move |url: String| {
            let client = client.clone();
            async move { client.get(&url).send().await.map_err(ohno::AppError::from) }
        }),
    )
        .into_service();

    service.execute(url.to_string()).await
}
