//! Playwright browser automation
//!
//! A single long-lived `node` process owns the browser. Commands travel as
//! JSON lines over its stdin and replies come back on stdout, so one browser
//! context serves a whole test.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use shopcheck_common::{CheckError, CheckResult, UiConfig};

use crate::locator::Locator;

const DRIVER_SCRIPT: &str = include_str!("driver.js");

/// Upper bound for browser start-up
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Slack on top of the action timeout before the driver is considered hung
const REPLY_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(CheckError::InvalidConfig(format!("unknown browser '{}'", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Directory whose `node_modules` provides `playwright`
    pub node_project_dir: PathBuf,
    /// Where screenshots, videos and traces for this session go
    pub artifacts_dir: PathBuf,
    pub record_video: bool,
    /// Trace file written when the session closes
    pub trace_path: Option<PathBuf>,
    pub action_timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.demoblaze.com/".to_string(),
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            node_project_dir: PathBuf::from("."),
            artifacts_dir: PathBuf::from("test-results/artifacts"),
            record_video: false,
            trace_path: None,
            action_timeout_ms: 30000,
        }
    }
}

impl PlaywrightConfig {
    pub fn from_ui(ui: &UiConfig, artifacts_dir: PathBuf) -> CheckResult<Self> {
        Ok(Self {
            base_url: ui.base_url.clone(),
            browser: ui.browser.parse()?,
            headless: ui.headless,
            viewport_width: ui.viewport_width,
            viewport_height: ui.viewport_height,
            node_project_dir: ui.node_project_dir.clone(),
            artifacts_dir,
            record_video: false,
            trace_path: None,
            action_timeout_ms: ui.action_timeout_ms,
        })
    }

    pub fn with_video(mut self, enabled: bool) -> Self {
        self.record_video = enabled;
        self
    }

    pub fn with_trace(mut self, path: Option<PathBuf>) -> Self {
        self.trace_path = path;
        self
    }

    pub fn video_dir(&self) -> PathBuf {
        self.artifacts_dir.join("video")
    }

    fn driver_options(&self) -> Value {
        serde_json::json!({
            "browser": self.browser.as_str(),
            "headless": self.headless,
            "viewport": { "width": self.viewport_width, "height": self.viewport_height },
            "baseUrl": self.base_url,
            "actionTimeout": self.action_timeout_ms,
            "videoDir": self.record_video.then(|| self.video_dir()),
            "tracePath": self.trace_path,
        })
    }
}

/// One browser operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DriverCommand {
    Goto { url: String },
    Click { locator: Locator, timeout_ms: u64 },
    Fill { locator: Locator, value: String, timeout_ms: u64 },
    TextContent { locator: Locator },
    IsVisible { locator: Locator },
    Count { locator: Locator },
    Attribute { locator: Locator, name: String },
    Title,
    Url,
    /// Forget previously seen dialogs
    ArmDialog,
    /// Message of the latest dialog since the last `ArmDialog`
    DialogMessage,
    Screenshot { path: PathBuf, full_page: bool },
    Close,
}

impl DriverCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DriverCommand::Goto { .. } => "goto",
            DriverCommand::Click { .. } => "click",
            DriverCommand::Fill { .. } => "fill",
            DriverCommand::TextContent { .. } => "text_content",
            DriverCommand::IsVisible { .. } => "is_visible",
            DriverCommand::Count { .. } => "count",
            DriverCommand::Attribute { .. } => "attribute",
            DriverCommand::Title => "title",
            DriverCommand::Url => "url",
            DriverCommand::ArmDialog => "arm_dialog",
            DriverCommand::DialogMessage => "dialog_message",
            DriverCommand::Screenshot { .. } => "screenshot",
            DriverCommand::Close => "close",
        }
    }
}

/// Something that can execute browser commands
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn execute(&self, command: DriverCommand) -> CheckResult<Value>;
}

#[derive(Serialize)]
struct Envelope<'a> {
    id: u64,
    #[serde(flatten)]
    command: &'a DriverCommand,
}

#[derive(Debug, Deserialize)]
struct DriverReply {
    id: i64,
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timeout: bool,
}

impl DriverReply {
    fn into_result(self, op: &str) -> CheckResult<Value> {
        if self.ok {
            return Ok(self.value);
        }
        let message = self.error.unwrap_or_else(|| "unknown driver error".to_string());
        if self.timeout {
            Err(CheckError::Timeout(format!("{}: {}", op, message)))
        } else {
            Err(CheckError::Playwright(format!("{}: {}", op, message)))
        }
    }
}

struct DriverIo {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl DriverIo {
    async fn read_reply(&mut self, id: u64) -> CheckResult<DriverReply> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .ok_or_else(|| CheckError::Playwright("driver process exited".to_string()))?;

            match serde_json::from_str::<DriverReply>(&line) {
                Ok(reply) if reply.id == id as i64 => return Ok(reply),
                Ok(reply) => debug!("Ignoring driver reply {} while waiting for {}", reply.id, id),
                Err(_) => debug!("[driver] {}", line),
            }
        }
    }
}

/// Playwright browser handle backed by a node child process
pub struct PlaywrightDriver {
    io: Mutex<DriverIo>,
    next_id: AtomicU64,
    reply_timeout: Duration,
    // Keeps the staged driver script alive for the lifetime of the process
    _script_dir: tempfile::TempDir,
}

impl PlaywrightDriver {
    /// Start node, launch the browser and wait until it is ready
    pub async fn launch(config: &PlaywrightConfig) -> CheckResult<Self> {
        check_playwright_installed(&config.node_project_dir).await?;
        std::fs::create_dir_all(&config.artifacts_dir)?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_SCRIPT)?;

        let project_dir = std::fs::canonicalize(&config.node_project_dir)
            .unwrap_or_else(|_| config.node_project_dir.clone());

        debug!(
            "Launching {} via {} (project {})",
            config.browser.as_str(),
            script_path.display(),
            project_dir.display()
        );

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(&project_dir)
            .env("NODE_PATH", project_dir.join("node_modules"))
            .env("SHOPCHECK_DRIVER_OPTIONS", config.driver_options().to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CheckError::Playwright("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CheckError::Playwright("driver stdout unavailable".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("[driver stderr] {}", line);
                }
            });
        }

        let mut io = DriverIo {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };

        let ready = tokio::time::timeout(LAUNCH_TIMEOUT, io.read_reply(0))
            .await
            .map_err(|_| CheckError::Timeout("browser launch".to_string()))??;
        let engine = ready.into_result("launch")?;
        info!("Browser ready: {}", engine.as_str().unwrap_or(config.browser.as_str()));

        Ok(Self {
            io: Mutex::new(io),
            next_id: AtomicU64::new(1),
            reply_timeout: Duration::from_millis(config.action_timeout_ms) + REPLY_GRACE,
            _script_dir: script_dir,
        })
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightDriver {
    async fn execute(&self, command: DriverCommand) -> CheckResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let op = command.name();

        let mut line = serde_json::to_string(&Envelope { id, command: &command })?;
        line.push('\n');

        let mut io = self.io.lock().await;
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        let reply = tokio::time::timeout(self.reply_timeout, io.read_reply(id))
            .await
            .map_err(|_| CheckError::Timeout(format!("{}: no reply from driver", op)))??;

        if matches!(command, DriverCommand::Close) {
            match tokio::time::timeout(Duration::from_secs(10), io.child.wait()).await {
                Ok(Ok(status)) => debug!("Driver exited: {}", status),
                _ => {
                    warn!("Driver did not exit after close, killing");
                    io.child.start_kill().ok();
                }
            }
        }

        reply.into_result(op)
    }
}

/// Check if Playwright is installed
async fn check_playwright_installed(project_dir: &Path) -> CheckResult<()> {
    let status = TokioCommand::new("npx")
        .args(["playwright", "--version"])
        .current_dir(project_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(CheckError::PlaywrightNotFound),
    }
}
