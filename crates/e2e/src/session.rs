//! Browser session handle
//!
//! [`Session`] wraps one [`BrowserDriver`] with the settings every page and
//! action needs. Page wrappers borrow it; only the owner closes it.

use regex::Regex;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use shopcheck_common::{CheckError, CheckResult, UiConfig};

use crate::locator::Locator;
use crate::playwright::{BrowserDriver, DriverCommand, PlaywrightConfig, PlaywrightDriver};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of one expectation check
enum Observation {
    Met,
    /// Not yet satisfied; carries what was observed
    Unmet(String),
}

pub struct Session {
    driver: Arc<dyn BrowserDriver>,
    base_url: String,
    expect_timeout: Duration,
    action_timeout: Duration,
    poll_interval: Duration,
}

impl Session {
    /// Launch a Playwright-backed session
    pub async fn launch(config: &PlaywrightConfig, ui: &UiConfig) -> CheckResult<Self> {
        let driver = PlaywrightDriver::launch(config).await?;
        Ok(Self::with_driver(Arc::new(driver), &config.base_url, ui.expect_timeout())
            .with_action_timeout(ui.action_timeout()))
    }

    /// Session over any driver implementation
    pub fn with_driver(
        driver: Arc<dyn BrowserDriver>,
        base_url: &str,
        expect_timeout: Duration,
    ) -> Self {
        Self {
            driver,
            base_url: base_url.to_string(),
            expect_timeout,
            action_timeout: Duration::from_secs(30),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn expect_timeout(&self) -> Duration {
        self.expect_timeout
    }

    /// Resolve `path` against the base URL; absolute URLs pass through
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/", base)
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn action_timeout_ms(&self) -> u64 {
        self.action_timeout.as_millis() as u64
    }

    pub async fn goto(&self, path: &str) -> CheckResult<()> {
        let url = self.url_for(path);
        debug!("goto {}", url);
        self.driver.execute(DriverCommand::Goto { url }).await?;
        Ok(())
    }

    pub async fn click(&self, locator: &Locator) -> CheckResult<()> {
        debug!("click {}", locator);
        self.driver
            .execute(DriverCommand::Click {
                locator: locator.clone(),
                timeout_ms: self.action_timeout_ms(),
            })
            .await?;
        Ok(())
    }

    pub async fn fill(&self, locator: &Locator, value: &str) -> CheckResult<()> {
        debug!("fill {}", locator);
        self.driver
            .execute(DriverCommand::Fill {
                locator: locator.clone(),
                value: value.to_string(),
                timeout_ms: self.action_timeout_ms(),
            })
            .await?;
        Ok(())
    }

    /// Text of the first match, `None` when nothing matches
    pub async fn text_content(&self, locator: &Locator) -> CheckResult<Option<String>> {
        let value = self
            .driver
            .execute(DriverCommand::TextContent { locator: locator.clone() })
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    pub async fn is_visible(&self, locator: &Locator) -> CheckResult<bool> {
        let value = self
            .driver
            .execute(DriverCommand::IsVisible { locator: locator.clone() })
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn count(&self, locator: &Locator) -> CheckResult<usize> {
        let value = self
            .driver
            .execute(DriverCommand::Count { locator: locator.clone() })
            .await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    pub async fn attribute(&self, locator: &Locator, name: &str) -> CheckResult<Option<String>> {
        let value = self
            .driver
            .execute(DriverCommand::Attribute {
                locator: locator.clone(),
                name: name.to_string(),
            })
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    pub async fn title(&self) -> CheckResult<String> {
        let value = self.driver.execute(DriverCommand::Title).await?;
        Ok(value_string(value))
    }

    pub async fn current_url(&self) -> CheckResult<String> {
        let value = self.driver.execute(DriverCommand::Url).await?;
        Ok(value_string(value))
    }

    /// Start listening for a fresh dialog
    pub async fn arm_dialog(&self) -> CheckResult<()> {
        self.driver.execute(DriverCommand::ArmDialog).await?;
        Ok(())
    }

    pub async fn dialog_message(&self) -> CheckResult<Option<String>> {
        let value = self.driver.execute(DriverCommand::DialogMessage).await?;
        Ok(value.as_str().map(str::to_string))
    }

    pub async fn screenshot(&self, path: &Path) -> CheckResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.driver
            .execute(DriverCommand::Screenshot {
                path: path.to_path_buf(),
                full_page: true,
            })
            .await?;
        Ok(())
    }

    pub async fn close(&self) -> CheckResult<()> {
        self.driver.execute(DriverCommand::Close).await?;
        Ok(())
    }

    async fn wait_until<F, Fut>(&self, expectation: String, mut check: F) -> CheckResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CheckResult<Observation>>,
    {
        let deadline = Instant::now() + self.expect_timeout;
        loop {
            match check().await? {
                Observation::Met => return Ok(()),
                Observation::Unmet(observed) => {
                    if Instant::now() >= deadline {
                        return Err(CheckError::Assertion(format!(
                            "{}, got {} (waited {} ms)",
                            expectation,
                            observed,
                            self.expect_timeout.as_millis()
                        )));
                    }
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub async fn expect_visible(&self, locator: &Locator) -> CheckResult<()> {
        self.wait_until(format!("expected {} to be visible", locator), move || async move {
            Ok(if self.is_visible(locator).await? {
                Observation::Met
            } else {
                Observation::Unmet("hidden or missing".to_string())
            })
        })
        .await
    }

    pub async fn expect_hidden(&self, locator: &Locator) -> CheckResult<()> {
        self.wait_until(format!("expected {} to be hidden", locator), move || async move {
            Ok(if self.is_visible(locator).await? {
                Observation::Unmet("visible".to_string())
            } else {
                Observation::Met
            })
        })
        .await
    }

    /// Whole text equals `expected`, ignoring case and runs of whitespace
    pub async fn expect_text(&self, locator: &Locator, expected: &str) -> CheckResult<()> {
        let wanted = normalize(expected);
        self.wait_until(format!("expected {} to have text {:?}", locator, expected), move || {
            let wanted = wanted.clone();
            async move {
                let text = self.text_content(locator).await?;
                Ok(match text {
                    Some(text) if normalize(&text) == wanted => Observation::Met,
                    other => Observation::Unmet(describe_text(other)),
                })
            }
        })
        .await
    }

    pub async fn expect_contains_text(&self, locator: &Locator, needle: &str) -> CheckResult<()> {
        let wanted = normalize(needle);
        self.wait_until(format!("expected {} to contain {:?}", locator, needle), move || {
            let wanted = wanted.clone();
            async move {
                let text = self.text_content(locator).await?;
                Ok(match text {
                    Some(text) if normalize(&text).contains(&wanted) => Observation::Met,
                    other => Observation::Unmet(describe_text(other)),
                })
            }
        })
        .await
    }

    pub async fn expect_matches(&self, locator: &Locator, pattern: &Regex) -> CheckResult<()> {
        self.wait_until(format!("expected {} to match /{}/", locator, pattern), move || async move {
            let text = self.text_content(locator).await?;
            Ok(match text {
                Some(text) if pattern.is_match(&text) => Observation::Met,
                other => Observation::Unmet(describe_text(other)),
            })
        })
        .await
    }

    pub async fn expect_count(&self, locator: &Locator, expected: usize) -> CheckResult<()> {
        let expectation = format!("expected {} to match {} element(s)", locator, expected);
        self.wait_until(expectation, move || async move {
            let count = self.count(locator).await?;
            Ok(if count == expected {
                Observation::Met
            } else {
                Observation::Unmet(count.to_string())
            })
        })
        .await
    }

    pub async fn expect_title(&self, pattern: &Regex) -> CheckResult<()> {
        self.wait_until(format!("expected page title to match /{}/", pattern), move || async move {
            let title = self.title().await?;
            Ok(if pattern.is_match(&title) {
                Observation::Met
            } else {
                Observation::Unmet(format!("{:?}", title))
            })
        })
        .await
    }

    pub async fn expect_url(&self, pattern: &Regex) -> CheckResult<()> {
        self.wait_until(format!("expected page URL to match /{}/", pattern), move || async move {
            let url = self.current_url().await?;
            Ok(if pattern.is_match(&url) {
                Observation::Met
            } else {
                Observation::Unmet(url)
            })
        })
        .await
    }

    /// A dialog seen since the last [`Session::arm_dialog`] contains `needle`
    pub async fn expect_dialog(&self, needle: &str) -> CheckResult<()> {
        self.wait_until(format!("expected a dialog containing {:?}", needle), move || async move {
            Ok(match self.dialog_message().await? {
                Some(message) if message.contains(needle) => Observation::Met,
                Some(message) => Observation::Unmet(format!("{:?}", message)),
                None => Observation::Unmet("no dialog".to_string()),
            })
        })
        .await
    }
}

/// Compile an expectation pattern
pub fn pattern(pattern: &str) -> CheckResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| CheckError::InvalidConfig(format!("bad pattern /{}/: {}", pattern, e)))
}

fn value_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn describe_text(text: Option<String>) -> String {
    match text {
        Some(text) => format!("{:?}", text.trim()),
        None => "no matching element".to_string(),
    }
}
