//! Shopcheck Common Library
//!
//! Configuration, retry policy, assertions, the suite runner and reports
//! shared by the UI, API and load crates.

pub mod assert;
pub mod config;
pub mod error;
pub mod report;
pub mod retry;
pub mod suite;
pub mod unique;

// Re-export commonly used types
pub use config::{ApiConfig, LlmConfig, RunConfig, SuiteConfig, UiConfig};
pub use error::{error_chain, CheckError, CheckResult};
pub use retry::RetryStrategy;
pub use suite::{
    Filter, Project, StepRecord, SuiteResult, SuiteRunner, TestCase, TestContext, TestResult,
    TestStatus,
};
pub use unique::{next_id, test_id};

/// Shopcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
