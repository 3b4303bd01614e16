//! Suite configuration
//!
//! Built once at process start from defaults, an optional TOML file and the
//! environment, then shared read-only (`Arc<SuiteConfig>`) with every
//! component that needs it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CheckError, CheckResult};
use crate::retry::RetryStrategy;

/// Read from the working directory when no file is named
pub const DEFAULT_CONFIG_FILE: &str = "shopcheck.toml";

/// Complete configuration for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Browser / storefront settings
    pub ui: UiConfig,

    /// Mock REST API settings
    pub api: ApiConfig,

    /// Local OpenAI-compatible endpoint settings
    pub llm: LlmConfig,

    /// Runner settings
    pub run: RunConfig,
}

/// Storefront UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Base URL of the storefront
    pub base_url: String,

    /// Browser engine (chromium, firefox, webkit)
    pub browser: String,

    /// Run without a visible window
    pub headless: bool,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Default timeout for auto-waiting expectations
    pub expect_timeout_ms: u64,

    /// Timeout for a single browser action (click, fill, goto)
    pub action_timeout_ms: u64,

    /// Directory whose `node_modules` provides `playwright`
    pub node_project_dir: PathBuf,

    pub trace_on_retry: bool,
    pub screenshot_on_failure: bool,
    pub video_on_failure: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.demoblaze.com/".to_string(),
            browser: "chromium".to_string(),
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            expect_timeout_ms: 5000,
            action_timeout_ms: 30000,
            node_project_dir: PathBuf::from("."),
            trace_on_retry: true,
            screenshot_on_failure: true,
            video_on_failure: true,
        }
    }
}

impl UiConfig {
    pub fn expect_timeout(&self) -> Duration {
        Duration::from_millis(self.expect_timeout_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }
}

/// Mock REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Log every outgoing request
    pub log_requests: bool,

    /// Log every received response
    pub log_responses: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jsonplaceholder.typicode.com".to_string(),
            timeout_ms: 30000,
            log_requests: false,
            log_responses: false,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Local LLM endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL including the `/v1` prefix
    pub base_url: String,

    /// Model name sent in completion requests
    pub model: String,

    /// Completion requests can be slow on local hardware
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            model: "zai-org/glm-4.7-flash".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Running under continuous integration
    pub is_ci: bool,

    /// Parallel test workers
    pub workers: usize,

    /// Upper bound for one test attempt
    pub test_timeout_ms: u64,

    /// Where reports and artifacts are written
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            is_ci: false,
            workers: 4,
            test_timeout_ms: 120_000,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl RunConfig {
    pub fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy::for_environment(self.is_ci)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.output_dir.join("artifacts")
    }
}

impl SuiteConfig {
    /// Load configuration for this process.
    ///
    /// Reads `.env` if present, then the TOML file, then applies environment
    /// overrides. An explicit `path` must exist; without one,
    /// [`DEFAULT_CONFIG_FILE`] is read when it is there.
    pub fn load(path: Option<&Path>) -> CheckResult<Self> {
        let base = match path {
            Some(path) if !path.exists() => {
                return Err(CheckError::InvalidConfig(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        dotenvy::dotenv().ok();
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> CheckResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            CheckError::InvalidConfig(format!("{}: {}", path.display(), e))
        })
    }

    /// Build from defaults plus an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> CheckResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Apply environment-style overrides on top of this configuration
    pub fn with_overrides<F>(mut self, lookup: F) -> CheckResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("BASE_URL") {
            self.ui.base_url = url;
        }
        if let Some(browser) = var("BROWSER") {
            self.ui.browser = browser;
        }
        if let Some(headless) = var("HEADLESS") {
            self.ui.headless = !headless.eq_ignore_ascii_case("false");
        }
        if let Some(dir) = var("PLAYWRIGHT_PROJECT_DIR") {
            self.ui.node_project_dir = PathBuf::from(dir);
        }

        if let Some(url) = var("API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = var("API_TIMEOUT") {
            self.api.timeout_ms = parse_number("API_TIMEOUT", &timeout)?;
        }
        if let Some(flag) = var("LOG_API_REQUESTS") {
            self.api.log_requests = flag == "true";
        }
        if let Some(flag) = var("LOG_API_RESPONSES") {
            self.api.log_responses = flag == "true";
        }

        if let Some(url) = var("LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = var("LLM_MODEL") {
            self.llm.model = model;
        }

        if var("CI").is_some() {
            self.run.is_ci = true;
        }
        if let Some(workers) = var("WORKERS") {
            self.run.workers = parse_number::<usize>("WORKERS", &workers)?.max(1);
        }
        if let Some(dir) = var("REPORT_DIR") {
            self.run.output_dir = PathBuf::from(dir);
        }

        Ok(self)
    }

    pub fn retry_strategy(&self) -> RetryStrategy {
        self.run.retry_strategy()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> CheckResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            CheckError::InvalidConfig(format!("{} must be a number, got '{}'", key, value))
        })
}
