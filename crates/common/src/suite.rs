//! Test registry and runner
//!
//! A [`TestCase`] is a named async body plus tags and a project. The
//! [`SuiteRunner`] filters cases, runs them on a bounded number of workers,
//! and re-runs failed cases when the [`RetryStrategy`] allows it.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::SuiteConfig;
use crate::error::{error_chain, CheckError, CheckResult};
use crate::retry::RetryStrategy;

pub type CaseFuture = BoxFuture<'static, CheckResult<()>>;
pub type CaseBody = Arc<dyn Fn(TestContext) -> CaseFuture + Send + Sync>;

/// Which target a test runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Project {
    /// Storefront through a real browser
    #[serde(rename = "chromium")]
    Browser,
    /// Public mock REST API
    Api,
    /// Local OpenAI-compatible endpoint
    LocalApi,
}

impl Project {
    pub fn as_str(&self) -> &'static str {
        match self {
            Project::Browser => "chromium",
            Project::Api => "api",
            Project::LocalApi => "local-api",
        }
    }

    pub fn all() -> [Project; 3] {
        [Project::Browser, Project::Api, Project::LocalApi]
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Project {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "browser" | "ui" => Ok(Project::Browser),
            "api" => Ok(Project::Api),
            "local-api" | "local" | "llm" => Ok(Project::LocalApi),
            other => Err(CheckError::InvalidConfig(format!(
                "unknown project '{}' (expected chromium, api or local-api)",
                other
            ))),
        }
    }
}

/// A registered test
pub struct TestCase {
    /// Describe-block title the test belongs to
    pub suite: String,
    pub name: String,
    /// Normalised tags (`@regression`, `@negative`, ...)
    pub tags: Vec<String>,
    pub project: Project,
    pub skip: bool,
    body: CaseBody,
}

impl TestCase {
    pub fn new<F, Fut>(
        suite: impl Into<String>,
        name: impl Into<String>,
        project: Project,
        body: F,
    ) -> Self
    where
        F: Fn(TestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CheckResult<()>> + Send + 'static,
    {
        Self {
            suite: suite.into(),
            name: name.into(),
            tags: Vec::new(),
            project,
            skip: false,
            body: Arc::new(move |ctx| Box::pin(body(ctx))),
        }
    }

    pub fn tagged(mut self, tags: &[&str]) -> Self {
        for tag in tags {
            if !self.has_tag(tag) {
                self.tags.push(normalize_tag(tag));
            }
        }
        self
    }

    /// Register the case but never run it
    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn title(&self) -> String {
        format!("{} › {}", self.suite, self.name)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        self.tags.iter().any(|t| *t == tag)
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("suite", &self.suite)
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("project", &self.project)
            .field("skip", &self.skip)
            .finish()
    }
}

fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim().to_lowercase();
    if tag.starts_with('@') {
        tag
    } else {
        format!("@{}", tag)
    }
}

/// One recorded step of a test attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub title: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Per-attempt handle given to a test body
#[derive(Clone)]
pub struct TestContext {
    config: Arc<SuiteConfig>,
    title: Arc<str>,
    attempt: u32,
    steps: Arc<Mutex<Vec<StepRecord>>>,
}

impl TestContext {
    pub fn new(config: Arc<SuiteConfig>, title: &str, attempt: u32) -> Self {
        Self {
            config,
            title: Arc::from(title),
            attempt,
            steps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<SuiteConfig> {
        Arc::clone(&self.config)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Zero-based retry count of this attempt
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Run one named step and record its outcome.
    ///
    /// The step's result is returned unchanged so a failure stops the test.
    pub async fn step<T, Fut>(&self, title: impl Into<String>, step: Fut) -> CheckResult<T>
    where
        Fut: Future<Output = CheckResult<T>>,
    {
        let title = title.into();
        debug!("  step: {}", title);
        let start = Instant::now();

        let result = step.await;

        let error = result.as_ref().err().map(|e| error_chain(e));
        if let Some(error) = &error {
            debug!("  step failed: {} - {}", title, error);
        }
        self.steps.lock().push(StepRecord {
            title,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
        });
        result
    }

    pub fn steps(&self) -> Vec<StepRecord> {
        self.steps.lock().clone()
    }

    /// Title of the most recent failed step
    pub fn failed_step(&self) -> Option<String> {
        self.steps
            .lock()
            .iter()
            .rev()
            .find(|s| s.error.is_some())
            .map(|s| s.title.clone())
    }

    /// Directory for artifacts (screenshots, video, traces) of this attempt
    pub fn artifact_dir(&self) -> PathBuf {
        let slug: String = self
            .title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        self.config
            .run
            .artifacts_dir()
            .join(format!("{}-retry{}", slug, self.attempt))
    }

    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.artifact_dir().join(file_name)
    }
}

/// Case selection by project, tag and title substring
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// A case matches when it carries any of these tags
    pub tags: Vec<String>,
    pub project: Option<Project>,
    pub grep: Option<String>,
}

impl Filter {
    pub fn matches(&self, case: &TestCase) -> bool {
        if let Some(project) = self.project {
            if case.project != project {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| case.has_tag(t)) {
            return false;
        }
        if let Some(grep) = &self.grep {
            if !case.title().to_lowercase().contains(&grep.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    /// Passed after at least one retry
    Flaky,
    Failed,
    Skipped,
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub suite: String,
    pub name: String,
    pub project: Project,
    pub tags: Vec<String>,
    pub status: TestStatus,
    pub attempts: u32,
    pub duration_ms: u64,
    pub steps: Vec<StepRecord>,
    pub error: Option<String>,
    pub failed_step: Option<String>,
}

impl TestResult {
    fn for_case(case: &TestCase, status: TestStatus) -> Self {
        Self {
            suite: case.suite.clone(),
            name: case.name.clone(),
            project: case.project,
            tags: case.tags.clone(),
            status,
            attempts: 0,
            duration_ms: 0,
            steps: Vec::new(),
            error: None,
            failed_step: None,
        }
    }

    pub fn title(&self) -> String {
        format!("{} › {}", self.suite, self.name)
    }
}

/// Result of running all selected tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub flaky: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl SuiteResult {
    fn from_results(results: Vec<TestResult>, duration_ms: u64) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            passed: count(TestStatus::Passed),
            failed: count(TestStatus::Failed),
            flaky: count(TestStatus::Flaky),
            skipped: count(TestStatus::Skipped),
            duration_ms,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs test cases with bounded parallelism and retries
pub struct SuiteRunner {
    config: Arc<SuiteConfig>,
    strategy: RetryStrategy,
    workers: usize,
}

impl SuiteRunner {
    pub fn new(config: Arc<SuiteConfig>) -> Self {
        let strategy = config.retry_strategy();
        let workers = config.run.workers.max(1);
        Self {
            config,
            strategy,
            workers,
        }
    }

    pub fn with_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Run every case matching `filter`
    pub async fn run(&self, cases: Vec<TestCase>, filter: &Filter) -> SuiteResult {
        let start = Instant::now();
        let selected: Vec<TestCase> = cases.into_iter().filter(|c| filter.matches(c)).collect();

        info!(
            "Running {} test(s) using {} worker(s), {} retries",
            selected.len(),
            self.workers,
            self.strategy.as_str()
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(selected.len());

        for case in selected {
            let semaphore = Arc::clone(&semaphore);
            let config = Arc::clone(&self.config);
            let strategy = self.strategy;
            let fallback = TestResult::for_case(&case, TestStatus::Failed);

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                execute_case(config, strategy, case).await
            });
            handles.push((handle, fallback));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (handle, mut fallback) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!("✗ {} - test task aborted: {}", fallback.title(), e);
                    fallback.attempts = 1;
                    fallback.error = Some(format!("test task aborted: {}", e));
                    results.push(fallback);
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let suite = SuiteResult::from_results(results, duration_ms);

        info!(
            "Test Results: {} passed, {} flaky, {} failed, {} skipped ({} ms)",
            suite.passed, suite.flaky, suite.failed, suite.skipped, duration_ms
        );
        suite
    }
}

async fn execute_case(
    config: Arc<SuiteConfig>,
    strategy: RetryStrategy,
    case: TestCase,
) -> TestResult {
    let title = case.title();
    let mut result = TestResult::for_case(&case, TestStatus::Skipped);

    if case.skip {
        info!("- {} (skipped)", title);
        return result;
    }

    let start = Instant::now();
    let test_timeout = config.run.test_timeout();
    let mut attempt = 0;

    loop {
        let ctx = TestContext::new(Arc::clone(&config), &title, attempt);
        debug!("Running test: {} (attempt {})", title, attempt + 1);

        let outcome = match tokio::time::timeout(test_timeout, (case.body)(ctx.clone())).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CheckError::Timeout(format!(
                "test exceeded {} ms",
                test_timeout.as_millis()
            ))),
        };

        result.attempts = attempt + 1;
        result.steps = ctx.steps();
        result.duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                result.status = if attempt == 0 {
                    TestStatus::Passed
                } else {
                    TestStatus::Flaky
                };
                info!("✓ {} ({} ms)", title, result.duration_ms);
                return result;
            }
            Err(e) => {
                let message = error_chain(&e);
                if strategy.should_retry(&message, attempt) {
                    let delay = strategy.delay(attempt);
                    warn!(
                        "↻ {} failed on attempt {}, retrying in {:?}: {}",
                        title,
                        attempt + 1,
                        delay,
                        message
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                error!("✗ {} - {}", title, message);
                result.status = TestStatus::Failed;
                result.failed_step = ctx.failed_step();
                result.error = Some(message);
                result.duration_ms = start.elapsed().as_millis() as u64;
                return result;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config() -> Arc<SuiteConfig> {
        Arc::new(SuiteConfig::default())
    }

    fn passing(name: &str, project: Project) -> TestCase {
        TestCase::new("suite", name, project, |_| async { Ok(()) })
    }

    #[test]
    fn test_filter_by_tag_and_project() {
        let case = passing("Check login", Project::Browser).tagged(&["@regression", "negative"]);

        assert!(Filter::default().matches(&case));
        assert!(Filter { tags: vec!["@negative".into()], ..Default::default() }.matches(&case));
        assert!(Filter { tags: vec!["REGRESSION".into()], ..Default::default() }.matches(&case));
        assert!(!Filter { tags: vec!["@demo".into()], ..Default::default() }.matches(&case));
        assert!(!Filter { project: Some(Project::Api), ..Default::default() }.matches(&case));
        assert!(Filter { grep: Some("login".into()), ..Default::default() }.matches(&case));
        assert!(!Filter { grep: Some("cart".into()), ..Default::default() }.matches(&case));
    }

    #[test]
    fn test_tags_normalized_without_duplicates() {
        let case = passing("Check cart", Project::Browser)
            .tagged(&["@smoke", "regression", "@Smoke"])
            .tagged(&["smoke", "@regression"]);

        assert_eq!(case.tags, vec!["@smoke".to_string(), "@regression".to_string()]);
    }

    #[test]
    fn test_project_parse() {
        assert_eq!("chromium".parse::<Project>().unwrap(), Project::Browser);
        assert_eq!("local-api".parse::<Project>().unwrap(), Project::LocalApi);
        assert!("mainframe".parse::<Project>().is_err());
    }

    #[tokio::test]
    async fn test_steps_recorded_and_fail_fast() {
        let ctx = TestContext::new(config(), "suite › case", 0);

        let first = ctx.step("When user opens the page", async { Ok::<_, CheckError>(1) }).await;
        assert_eq!(first.unwrap(), 1);

        let second: CheckResult<()> = ctx
            .step("Then the title is shown", async { Err(CheckError::assertion("no title")) })
            .await;
        assert!(second.is_err());

        let steps = ctx.steps();
        assert_eq!(steps.len(), 2);
        assert!(steps[0].error.is_none());
        assert_eq!(ctx.failed_step().as_deref(), Some("Then the title is shown"));
    }

    #[tokio::test]
    async fn test_runner_counts() {
        let cases = vec![
            passing("a", Project::Api),
            passing("b", Project::Api).skipped(),
            TestCase::new("suite", "c", Project::Api, |_| async {
                Err(CheckError::assertion("expected 100 posts, got 99"))
            }),
        ];

        let result = SuiteRunner::new(config()).run(cases, &Filter::default()).await;
        assert_eq!(result.total, 3);
        assert_eq!(result.passed, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 1);
        assert!(!result.success());

        let failed = result.results.iter().find(|r| r.name == "c").unwrap();
        assert_eq!(failed.attempts, 1);
        assert!(failed.error.as_deref().unwrap().contains("expected 100 posts"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_retried_then_flaky() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let case = TestCase::new("suite", "flaky", Project::Api, move |ctx| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if ctx.attempt() == 0 {
                    Err(CheckError::Timeout("GET /posts".into()))
                } else {
                    Ok(())
                }
            }
        });

        let runner = SuiteRunner::new(config()).with_strategy(RetryStrategy::Conservative);
        let result = runner.run(vec![case], &Filter::default()).await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(result.flaky, 1);
        assert_eq!(result.results[0].attempts, 2);
        assert!(result.success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_exhausted() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let case = TestCase::new("suite", "always times out", Project::Api, move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CheckError::Timeout("navigation".into()))
            }
        });

        let runner = SuiteRunner::new(config()).with_strategy(RetryStrategy::Aggressive);
        let result = runner.run(vec![case], &Filter::default()).await;

        assert_eq!(runs.load(Ordering::SeqCst), 4);
        assert_eq!(result.failed, 1);
        assert_eq!(result.results[0].attempts, 4);
    }

    #[tokio::test]
    async fn test_assertion_not_retried() {
        let runs = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&runs);
        let case = TestCase::new("suite", "wrong status", Project::Api, move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CheckError::assertion("status: expected 201, got 500"))
            }
        });

        let runner = SuiteRunner::new(config()).with_strategy(RetryStrategy::Aggressive);
        let result = runner.run(vec![case], &Filter::default()).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(result.failed, 1);
    }

    #[test]
    fn test_artifact_path_slug() {
        let ctx = TestContext::new(config(), "Cart › Add Samsung galaxy s6!", 1);
        let path = ctx.artifact_path("failure.png");
        assert_eq!(
            path,
            PathBuf::from("test-results/artifacts/cart-add-samsung-galaxy-s6-retry1/failure.png")
        );
    }
}
