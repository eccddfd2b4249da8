//! Retry logic with exponential backoff.
//!
//! Based on Chromium's `HttpNetworkTransaction::RetryReason` enum and retry
//! logic, extended with the wiki's own "come back later" signals: HTTP 503
//! and the `maxlag` API error, both of which usually carry `Retry-After`.

use crate::base::neterror::NetError;
use http::HeaderMap;
use std::time::Duration;

/// Reasons for retrying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// Server closed connection unexpectedly
    ConnectionReset,
    /// Connection was closed during request
    ConnectionClosed,
    /// Connection was aborted
    ConnectionAborted,
    /// Socket not connected
    SocketNotConnected,
    /// Empty response received
    EmptyResponse,
    /// HTTP request timeout
    HttpRequestTimeout,
    /// HTTP 503 from the server or a cache in front of it
    ServiceUnavailable,
    /// Database replication lag above the requested `maxlag`
    MaxLag,
}

impl RetryReason {
    /// Map a NetError to a RetryReason, if the error is retryable.
    pub fn from_error(error: &NetError) -> Option<Self> {
        match error {
            NetError::ConnectionReset => Some(Self::ConnectionReset),
            NetError::ConnectionClosed => Some(Self::ConnectionClosed),
            NetError::ConnectionAborted => Some(Self::ConnectionAborted),
            NetError::SocketNotConnected => Some(Self::SocketNotConnected),
            NetError::EmptyResponse => Some(Self::EmptyResponse),
            NetError::ConnectionTimedOut => Some(Self::HttpRequestTimeout),
            NetError::HttpStatus { status: 503 } => Some(Self::ServiceUnavailable),
            NetError::Api { code, .. } if code == "maxlag" => Some(Self::MaxLag),
            _ => None,
        }
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3, matching Chromium)
    pub max_attempts: usize,
    /// Base delay for exponential backoff in milliseconds (default: 100)
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds (default: 5000)
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0) to randomize delays (default: 0.1)
    pub jitter_factor: f64,
    /// Longest server-requested `Retry-After` to honor (default: 30s)
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5000,
            jitter_factor: 0.1,
            max_retry_after: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }

    /// Create a config with aggressive retries.
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 50,
            max_delay_ms: 10000,
            jitter_factor: 0.2,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt`, preferring the server's hint.
    pub fn delay_for(&self, attempt: usize, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => hint.min(self.max_retry_after),
            None => calculate_backoff(attempt, self),
        }
    }
}

/// Calculate backoff delay for a given attempt.
///
/// Uses exponential backoff: `base_delay * 2^attempt`
/// Capped at `max_delay_ms`.
pub fn calculate_backoff(attempt: usize, config: &RetryConfig) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    // Exponential: base * 2^(attempt-1)
    let delay_ms = config
        .base_delay_ms
        .saturating_mul(1 << (attempt - 1).min(10));
    let capped_ms = delay_ms.min(config.max_delay_ms);

    // Add jitter
    let jitter_range = (capped_ms as f64 * config.jitter_factor) as u64;
    let jittered_ms = if jitter_range > 0 {
        // Simple deterministic jitter based on attempt number
        let jitter = (attempt as u64 * 7) % jitter_range;
        capped_ms.saturating_add(jitter)
    } else {
        capped_ms
    };

    Duration::from_millis(jittered_ms)
}

/// Check if we should retry based on attempt count.
pub fn should_retry(attempt: usize, config: &RetryConfig) -> bool {
    attempt < config.max_attempts
}

/// Read a `Retry-After` header given in seconds. HTTP-date values are not
/// used by MediaWiki and are ignored.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(http::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_exponential() {
        let config = RetryConfig {
            jitter_factor: 0.0,
            ..Default::default()
        };

        assert_eq!(calculate_backoff(0, &config), Duration::ZERO);
        assert_eq!(calculate_backoff(1, &config), Duration::from_millis(100));
        assert_eq!(calculate_backoff(2, &config), Duration::from_millis(200));
        assert_eq!(calculate_backoff(3, &config), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_capped() {
        let config = RetryConfig {
            base_delay_ms: 1000,
            max_delay_ms: 2000,
            jitter_factor: 0.0,
            ..Default::default()
        };

        assert_eq!(calculate_backoff(1, &config), Duration::from_millis(1000));
        assert_eq!(calculate_backoff(2, &config), Duration::from_millis(2000)); // capped
        assert_eq!(calculate_backoff(3, &config), Duration::from_millis(2000)); // capped
    }

    #[test]
    fn test_should_retry() {
        let config = RetryConfig::default(); // max_attempts = 3

        assert!(should_retry(0, &config));
        assert!(should_retry(2, &config));
        assert!(!should_retry(3, &config));
    }

    #[test]
    fn test_no_retry_config() {
        let config = RetryConfig::no_retry();
        assert!(!should_retry(0, &config));
    }

    #[test]
    fn test_retry_reasons() {
        assert_eq!(
            RetryReason::from_error(&NetError::ConnectionReset),
            Some(RetryReason::ConnectionReset)
        );
        assert_eq!(
            RetryReason::from_error(&NetError::HttpStatus { status: 503 }),
            Some(RetryReason::ServiceUnavailable)
        );
        assert_eq!(
            RetryReason::from_error(&NetError::api("maxlag", "lagged")),
            Some(RetryReason::MaxLag)
        );
        assert_eq!(
            RetryReason::from_error(&NetError::HttpStatus { status: 404 }),
            None
        );
        assert_eq!(
            RetryReason::from_error(&NetError::api("badtoken", "bad")),
            None
        );
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(http::header::RETRY_AFTER, "5".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(5)));

        headers.insert(
            http::header::RETRY_AFTER,
            "Wed, 21 Oct 2015 07:28:00 GMT".parse().unwrap(),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_delay_prefers_server_hint_with_cap() {
        let config = RetryConfig::default();
        assert_eq!(
            config.delay_for(1, Some(Duration::from_secs(5))),
            Duration::from_secs(5)
        );
        assert_eq!(
            config.delay_for(1, Some(Duration::from_secs(600))),
            Duration::from_secs(30)
        );
        assert_eq!(config.delay_for(0, None), Duration::ZERO);
    }
}
