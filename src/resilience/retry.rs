use crate::transport::HttpResponse;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for server-error retries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt; total calls are `max_retries + 1`.
    pub max_retries: u32,
    /// Linear backoff slope: retry `n` (0-based) waits `1 + n * multiplier` seconds.
    pub backoff_multiplier: f64,
    /// Top-level JSON field carrying the server's wait hint, in seconds.
    pub throttle_field: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            backoff_multiplier: 1.0,
            throttle_field: "ThrottleSeconds".to_string(),
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_throttle_field(mut self, field: impl Into<String>) -> Self {
        self.throttle_field = field.into();
        self
    }
}

/// What to do after a response came back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Retry { delay: Duration },
    Done,
}

/// Retry policy for 5xx responses.
///
/// Only the server-error class is retried. Success, redirects and client
/// errors are final on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    /// Decide what to do with `response`.
    ///
    /// `attempt` counts retries already performed (0 after the first call).
    pub fn decide(&self, response: &HttpResponse, attempt: u32) -> Decision {
        if !response.is_server_error() || attempt >= self.config.max_retries {
            return Decision::Done;
        }
        Decision::Retry {
            delay: self.delay_for(response, attempt),
        }
    }

    /// Server throttle hint if the body carries a usable one, else linear backoff.
    ///
    /// A hint too large to represent as a `Duration` counts as no hint.
    pub fn delay_for(&self, response: &HttpResponse, attempt: u32) -> Duration {
        response
            .throttle_seconds(&self.config.throttle_field)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or_else(|| self.backoff_delay(attempt))
    }

    /// `1 + attempt * multiplier` seconds, saturating at `Duration::MAX`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let multiplier = if self.config.backoff_multiplier.is_finite() {
            self.config.backoff_multiplier.max(0.0)
        } else {
            0.0
        };
        Duration::try_from_secs_f64(1.0 + attempt as f64 * multiplier).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error() -> HttpResponse {
        HttpResponse::new(503, "Service Unavailable")
    }

    #[test]
    fn test_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 10);
        assert_eq!(config.backoff_multiplier, 1.0);
        assert_eq!(config.throttle_field, "ThrottleSeconds");
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(9), Duration::from_secs(10));

        let policy = RetryPolicy::new(RetryConfig::new().with_backoff_multiplier(0.5));
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(2500));
    }

    #[test]
    fn test_bad_multiplier_degrades_to_constant() {
        for m in [-3.0, f64::NAN, f64::INFINITY] {
            let policy = RetryPolicy::new(RetryConfig::new().with_backoff_multiplier(m));
            assert_eq!(policy.backoff_delay(5), Duration::from_secs(1));
        }
    }

    #[test]
    fn test_oversized_multiplier_saturates() {
        let policy = RetryPolicy::new(RetryConfig::new().with_backoff_multiplier(1e300));
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(1), Duration::MAX);
    }

    #[test]
    fn test_server_errors_retry_until_budget_spent() {
        let policy = RetryPolicy::default();
        for attempt in 0..10 {
            assert_eq!(
                policy.decide(&server_error(), attempt),
                Decision::Retry {
                    delay: Duration::from_secs(1 + attempt as u64)
                }
            );
        }
        assert_eq!(policy.decide(&server_error(), 10), Decision::Done);
    }

    #[test]
    fn test_plain_500_is_retried() {
        let policy = RetryPolicy::default();
        let r = HttpResponse::new(500, "");
        assert!(matches!(policy.decide(&r, 0), Decision::Retry { .. }));
    }

    #[test]
    fn test_non_server_errors_are_final() {
        let policy = RetryPolicy::default();
        for status in [200u16, 201, 204, 301, 400, 401, 404, 429] {
            assert_eq!(
                policy.decide(&HttpResponse::new(status, ""), 0),
                Decision::Done,
                "status {}",
                status
            );
        }
    }

    #[test]
    fn test_throttle_overrides_backoff() {
        let policy = RetryPolicy::default();
        let r = HttpResponse::new(503, r#"{"ErrorCode": 36, "ThrottleSeconds": 7}"#);
        assert_eq!(
            policy.decide(&r, 4),
            Decision::Retry {
                delay: Duration::from_secs(7)
            }
        );
    }

    #[test]
    fn test_zero_throttle_falls_back_to_backoff() {
        let policy = RetryPolicy::default();
        let r = HttpResponse::new(503, r#"{"ThrottleSeconds": 0}"#);
        assert_eq!(policy.delay_for(&r, 2), Duration::from_secs(3));
    }

    #[test]
    fn test_out_of_range_throttle_falls_back_to_backoff() {
        let policy = RetryPolicy::default();
        for body in [
            r#"{"ThrottleSeconds": 1e30}"#,
            r#"{"ThrottleSeconds": "1e300"}"#,
        ] {
            let r = HttpResponse::new(503, body);
            assert_eq!(policy.delay_for(&r, 0), Duration::from_secs(1), "{}", body);
            assert_eq!(
                policy.decide(&r, 3),
                Decision::Retry {
                    delay: Duration::from_secs(4)
                }
            );
        }
    }

    #[test]
    fn test_custom_throttle_field() {
        let policy = RetryPolicy::new(RetryConfig::new().with_throttle_field("retry_after"));
        let r = HttpResponse::new(502, r#"{"retry_after": 4, "ThrottleSeconds": 9}"#);
        assert_eq!(policy.delay_for(&r, 0), Duration::from_secs(4));
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(RetryConfig::new().with_max_retries(0));
        assert_eq!(policy.decide(&server_error(), 0), Decision::Done);
    }
}
