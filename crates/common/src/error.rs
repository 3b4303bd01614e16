//! Error types for shopcheck

use thiserror::Error;

/// Result type alias using [`CheckError`]
pub type CheckResult<T> = std::result::Result<T, CheckError>;

/// Errors raised while driving a check.
///
/// Assertion failures are expected-vs-actual mismatches and are never
/// recovered. Timeouts and transport errors are the transient class the
/// retry strategy may re-run a test for.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Load test error: {0}")]
    Load(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CheckError {
    /// Shorthand for an assertion failure.
    pub fn assertion(message: impl Into<String>) -> Self {
        CheckError::Assertion(message.into())
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, CheckError::Assertion(_))
    }
}

/// Flatten an error and all of its sources into one line.
///
/// Transport errors usually carry the interesting part ("connection refused",
/// "operation timed out") in a nested source, which is what the retry
/// strategy matches against.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_error_chain_includes_sources() {
        let inner =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let chain = error_chain(&Outer(inner));
        assert_eq!(chain, "outer failure: connection refused");
    }

    #[test]
    fn test_error_chain_skips_repeated_text() {
        let err = CheckError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(error_chain(&err), "IO error: disk full");
    }

    #[test]
    fn test_assertion_message() {
        let err = CheckError::assertion("expected 200, got 404");
        assert!(err.is_assertion());
        assert_eq!(err.to_string(), "Assertion failed: expected 200, got 404");
    }
}
