//! Virtual-user executor
//!
//! A controller publishes the profile's target VU count on a watch channel
//! every tick. VU `n` iterates while `n < target`, parks while it is above
//! the target and exits once the run is over. An iteration that has started
//! always completes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use shopcheck_common::{CheckError, CheckResult};

use crate::metrics::{Metrics, Sample, Summary};
use crate::script::{LoadScript, Observed, Step};
use crate::thresholds::ThresholdViolation;

const DEFAULT_TICK: Duration = Duration::from_millis(250);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const PROGRESS_EVERY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Control {
    target: usize,
    running: bool,
}

/// Outcome of one load script run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub script: String,
    pub base_url: String,
    pub max_vus: usize,
    pub summary: Summary,
    pub violations: Vec<ThresholdViolation>,
}

impl LoadReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

pub struct LoadRunner {
    http: reqwest::Client,
    tick: Duration,
}

impl LoadRunner {
    pub fn new() -> CheckResult<Self> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> CheckResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            tick: DEFAULT_TICK,
        })
    }

    /// How often the controller re-evaluates the target VU count
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(10));
        self
    }

    pub async fn run(&self, script: &LoadScript) -> CheckResult<LoadReport> {
        script.profile.validate()?;
        if script.steps.is_empty() {
            return Err(CheckError::Load(format!("script '{}' has no steps", script.name)));
        }

        let total = script.profile.total_duration();
        let max_vus = script.profile.max_vus();
        info!(
            "Running load script {} against {} ({} max VUs over {:?})",
            script.name, script.base_url, max_vus, total
        );

        let script = Arc::new(script.clone());
        let metrics = Arc::new(Metrics::new());
        let (control, watcher) = watch::channel(Control {
            target: 0,
            running: true,
        });

        let start = Instant::now();
        let mut vus: Vec<JoinHandle<()>> = Vec::new();
        let mut last_progress = Instant::now();

        loop {
            let elapsed = start.elapsed();
            if elapsed >= total {
                break;
            }

            let target = script.profile.target_at(elapsed);
            control.send_if_modified(|current| {
                let changed = current.target != target;
                current.target = target;
                changed
            });

            while vus.len() < target {
                let id = vus.len();
                vus.push(tokio::spawn(virtual_user(
                    id,
                    self.http.clone(),
                    Arc::clone(&script),
                    Arc::clone(&metrics),
                    watcher.clone(),
                )));
            }

            if last_progress.elapsed() >= PROGRESS_EVERY {
                info!(
                    "{}: {:?} elapsed, {} VUs, {} requests",
                    script.name,
                    elapsed,
                    target,
                    metrics.request_count()
                );
                last_progress = Instant::now();
            }

            tokio::time::sleep(self.tick.min(total - elapsed)).await;
        }

        control.send_modify(|current| current.running = false);
        debug!("{}: waiting for {} VUs to finish", script.name, vus.len());
        for vu in vus {
            if let Err(e) = vu.await {
                warn!("virtual user task failed: {}", e);
            }
        }

        let summary = metrics.summary(start.elapsed());
        let violations = script.thresholds.evaluate(&summary);
        for violation in &violations {
            warn!("threshold crossed: {}", violation);
        }
        info!(
            "{} finished: {} requests, {:.2}% failed, p95 {:.0} ms",
            script.name,
            summary.requests,
            summary.failure_rate * 100.0,
            summary.p95_ms
        );

        Ok(LoadReport {
            script: script.name.to_string(),
            base_url: script.base_url.clone(),
            max_vus,
            summary,
            violations,
        })
    }
}

async fn virtual_user(
    id: usize,
    http: reqwest::Client,
    script: Arc<LoadScript>,
    metrics: Arc<Metrics>,
    mut control: watch::Receiver<Control>,
) {
    let mut iteration = 0u64;
    loop {
        let Control { target, running } = *control.borrow_and_update();
        if !running {
            break;
        }
        if id >= target {
            if control.changed().await.is_err() {
                break;
            }
            continue;
        }

        for step in &script.steps {
            execute_step(&http, &script, step, &metrics).await;
        }
        metrics.record_iteration();
        debug!("{}: iteration completed for session_{}_{}", script.name, id, iteration);
        iteration += 1;
    }
}

async fn execute_step(http: &reqwest::Client, script: &LoadScript, step: &Step, metrics: &Metrics) {
    let url = script.url(step.target.pick());
    let mut request = http.request(step.method.clone(), &url);
    if let Some(payload) = &step.payload {
        let (body, content_type) = payload.render();
        request = request.header("content-type", content_type).body(body);
    }

    let start = Instant::now();
    let (status, body) = match request.send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            match response.bytes().await {
                Ok(body) => (Some(status), body.to_vec()),
                Err(e) => {
                    debug!("{} {}: body read failed: {}", step.method, url, e);
                    (Some(status), Vec::new())
                }
            }
        }
        Err(e) => {
            debug!("{} {}: {}", step.method, url, e);
            (None, Vec::new())
        }
    };
    let duration = start.elapsed();

    debug!(
        "{} {} -> {:?} in {} ms ({} bytes)",
        step.method,
        url,
        status,
        duration.as_millis(),
        body.len()
    );
    metrics.record(Sample {
        duration,
        status,
        bytes: body.len(),
    });

    let observed = Observed {
        status,
        duration,
        body: &body,
    };
    for check in &step.checks {
        metrics.record_check(&check.name, check.evaluate(&observed));
    }

    let think_time = step.think_time.unwrap_or(script.think_time);
    if !think_time.is_zero() {
        tokio::time::sleep(think_time).await;
    }
}
