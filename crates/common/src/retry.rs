//! Retry policy for failed tests
//!
//! The runner consults the strategy after a test attempt fails. `attempt` is
//! zero-based: the number of retries already spent on the test.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Failure fragments that mark an error as transient in CI
const AGGRESSIVE_KEYWORDS: &[&str] = &[
    "net::",
    "timeout",
    "econnrefused",
    "etimedout",
    "failed to load",
    "navigation",
    "connection refused",
    "timed out",
];

/// The narrower set used for local runs
const CONSERVATIVE_KEYWORDS: &[&str] = &[
    "timeout",
    "econnrefused",
    "etimedout",
    "connection refused",
    "timed out",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStrategy {
    /// CI: more retries, exponential backoff, broad transient matching
    Aggressive,
    /// Local: one quick retry on clearly transient errors
    Conservative,
}

impl RetryStrategy {
    pub fn for_environment(is_ci: bool) -> Self {
        if is_ci {
            RetryStrategy::Aggressive
        } else {
            RetryStrategy::Conservative
        }
    }

    pub fn max_attempts(&self) -> u32 {
        match self {
            RetryStrategy::Aggressive => 3,
            RetryStrategy::Conservative => 1,
        }
    }

    /// Whether a failure with this message should be re-run
    pub fn should_retry(&self, message: &str, attempt: u32) -> bool {
        if attempt >= self.max_attempts() {
            return false;
        }

        let message = message.to_lowercase();
        self.keywords().iter().any(|keyword| message.contains(keyword))
    }

    /// Pause before the retry following `attempt`
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            RetryStrategy::Aggressive => {
                Duration::from_millis(2u64.saturating_pow(attempt).saturating_mul(1000))
            }
            RetryStrategy::Conservative => Duration::from_millis(500),
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            RetryStrategy::Aggressive => AGGRESSIVE_KEYWORDS,
            RetryStrategy::Conservative => CONSERVATIVE_KEYWORDS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RetryStrategy::Aggressive => "aggressive",
            RetryStrategy::Conservative => "conservative",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_selection_by_environment() {
        assert_eq!(RetryStrategy::for_environment(true), RetryStrategy::Aggressive);
        assert_eq!(RetryStrategy::for_environment(false), RetryStrategy::Conservative);
        assert_eq!(RetryStrategy::Aggressive.max_attempts(), 3);
        assert_eq!(RetryStrategy::Conservative.max_attempts(), 1);
    }

    #[test_case(0, true ; "first failure")]
    #[test_case(1, true ; "second failure")]
    #[test_case(2, true ; "third failure")]
    #[test_case(3, false ; "budget exhausted")]
    #[test_case(7, false ; "past budget")]
    fn test_aggressive_timeout_retry(attempt: u32, expected: bool) {
        let strategy = RetryStrategy::Aggressive;
        let message = "Navigation TIMEOUT of 30000ms exceeded";
        assert_eq!(strategy.should_retry(message, attempt), expected);
    }

    #[test]
    fn test_aggressive_never_retries_at_budget() {
        let strategy = RetryStrategy::Aggressive;
        for message in ["timeout", "net::ERR_CONNECTION_RESET", "anything at all"] {
            assert!(!strategy.should_retry(message, 3));
        }
    }

    #[test_case("net::ERR_NAME_NOT_RESOLVED", true)]
    #[test_case("page.goto: Navigation failed", true)]
    #[test_case("Failed to load resource", true)]
    #[test_case("connect ECONNREFUSED 127.0.0.1:443", true)]
    #[test_case("Assertion failed: expected 200, got 404", false)]
    fn test_aggressive_keywords(message: &str, expected: bool) {
        assert_eq!(RetryStrategy::Aggressive.should_retry(message, 0), expected);
    }

    #[test_case("Timeout waiting for: click", true)]
    #[test_case("error sending request: connection refused", true)]
    #[test_case("operation timed out", true)]
    #[test_case("net::ERR_CONNECTION_RESET", false)]
    #[test_case("Navigation failed", false)]
    fn test_conservative_keywords(message: &str, expected: bool) {
        assert_eq!(RetryStrategy::Conservative.should_retry(message, 0), expected);
    }

    #[test]
    fn test_conservative_single_retry() {
        assert!(RetryStrategy::Conservative.should_retry("timeout", 0));
        assert!(!RetryStrategy::Conservative.should_retry("timeout", 1));
    }

    #[test]
    fn test_delays() {
        for attempt in 0..5 {
            assert_eq!(RetryStrategy::Conservative.delay(attempt), Duration::from_millis(500));
            assert_eq!(
                RetryStrategy::Aggressive.delay(attempt),
                Duration::from_millis(2u64.pow(attempt) * 1000)
            );
        }
        assert_eq!(RetryStrategy::Aggressive.delay(0), Duration::from_secs(1));
        assert_eq!(RetryStrategy::Aggressive.delay(2), Duration::from_secs(4));
    }
}
