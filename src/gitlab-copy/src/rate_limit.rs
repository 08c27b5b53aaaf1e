//! Rate limiting utilities for the GitLab API.
//!
//! GitLab reports its rate limit state in `RateLimit-*` response headers and
//! answers HTTP 429 with a `Retry-After` header once the limit is hit. These
//! helpers read those headers and wait when needed.

use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{info, warn};

/// Maximum time to wait for rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Wait applied on HTTP 429 when no `Retry-After` header is present.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Rate limit information from a response.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Reads `RateLimit-Remaining`, `RateLimit-Reset` and `RateLimit-Limit`.
    ///
    /// Returns `None` when the server does not send them (rate limiting
    /// disabled on self-managed instances).
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(Self {
            remaining: header_value(headers, "ratelimit-remaining")?,
            reset: header_value(headers, "ratelimit-reset")?,
            limit: header_value(headers, "ratelimit-limit").unwrap_or_default(),
        })
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Reads the `Retry-After` header (in seconds).
#[must_use]
pub fn retry_after_secs(headers: &HeaderMap) -> u64 {
    header_value(headers, "retry-after").unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Waits if the rate limit is low, returning true if we waited.
///
/// This function proactively waits when remaining requests fall below
/// `MIN_REMAINING_THRESHOLD` to avoid hitting hard limits.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    if info.remaining >= MIN_REMAINING_THRESHOLD {
        return false;
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if info.reset <= now {
        return false;
    }

    let wait_secs = info.reset - now;
    if wait_secs > MAX_WAIT_SECS {
        warn!(
            wait_secs,
            max_wait = MAX_WAIT_SECS,
            "Rate limit reset too far in future, capping wait time"
        );
    }

    let actual_wait = wait_secs.min(MAX_WAIT_SECS);
    info!(
        remaining = info.remaining,
        limit = info.limit,
        wait_secs = actual_wait,
        "Rate limit low, waiting for reset"
    );

    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
    true
}

/// Waits for rate limit reset with a specific duration.
///
/// # Arguments
///
/// * `retry_after_secs` - Seconds to wait (from Retry-After header)
pub async fn wait_for_retry_after(retry_after_secs: u64) {
    let actual_wait = retry_after_secs.min(MAX_WAIT_SECS);
    info!(
        retry_after = retry_after_secs,
        actual_wait, "Received Retry-After header, waiting"
    );
    tokio::time::sleep(Duration::from_secs(actual_wait)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn reads_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-remaining", HeaderValue::from_static("10"));
        headers.insert("ratelimit-reset", HeaderValue::from_static("1234567890"));
        headers.insert("ratelimit-limit", HeaderValue::from_static("600"));

        let info = RateLimitInfo::from_headers(&headers).unwrap();

        assert_eq!(info.remaining, 10);
        assert_eq!(info.reset, 1234567890);
        assert_eq!(info.limit, 600);
    }

    #[test]
    fn missing_headers_yield_none() {
        assert!(RateLimitInfo::from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn retry_after_defaults_when_absent() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_secs(&headers), DEFAULT_RETRY_AFTER_SECS);

        headers.insert("retry-after", HeaderValue::from_static("3"));
        assert_eq!(retry_after_secs(&headers), 3);
    }

    #[tokio::test]
    async fn test_wait_if_needed_no_wait() {
        let info = RateLimitInfo {
            remaining: 100,
            reset: 0,
            limit: 1000,
        };

        let waited = wait_if_needed(&info).await;
        assert!(!waited);
    }

    #[tokio::test]
    async fn test_wait_if_needed_reset_passed() {
        let info = RateLimitInfo {
            remaining: 1,
            reset: 0, // Already passed
            limit: 30,
        };

        let waited = wait_if_needed(&info).await;
        assert!(!waited);
    }
}
