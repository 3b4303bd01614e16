//! Request samples and check counters collected by the virtual users

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One HTTP request as seen by a virtual user
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub duration: Duration,
    /// `None` when the request never got a response
    pub status: Option<u16>,
    pub bytes: usize,
}

impl Sample {
    /// Transport errors and 4xx/5xx statuses count as failed
    pub fn failed(&self) -> bool {
        self.status.map_or(true, |status| status >= 400)
    }
}

#[derive(Debug, Default)]
struct Inner {
    samples: Vec<Sample>,
    checks: BTreeMap<String, (u64, u64)>,
    iterations: u64,
}

/// Shared collector, cloned behind an `Arc` into every VU
#[derive(Debug, Default)]
pub struct Metrics {
    inner: Mutex<Inner>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, sample: Sample) {
        self.inner.lock().samples.push(sample);
    }

    pub fn record_check(&self, name: &str, passed: bool) {
        let mut inner = self.inner.lock();
        let entry = inner.checks.entry(name.to_string()).or_insert((0, 0));
        if passed {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    pub fn record_iteration(&self) {
        self.inner.lock().iterations += 1;
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().samples.len()
    }

    /// Aggregate everything recorded so far over a run of `elapsed`
    pub fn summary(&self, elapsed: Duration) -> Summary {
        let inner = self.inner.lock();

        let mut durations: Vec<Duration> = inner.samples.iter().map(|s| s.duration).collect();
        durations.sort_unstable();

        let requests = inner.samples.len() as u64;
        let failures = inner.samples.iter().filter(|s| s.failed()).count() as u64;
        let bytes_received = inner.samples.iter().map(|s| s.bytes as u64).sum();

        let ms = |d: Duration| d.as_nanos() as f64 / 1_000_000.0;
        let avg_ms = if durations.is_empty() {
            0.0
        } else {
            durations.iter().map(|d| ms(*d)).sum::<f64>() / durations.len() as f64
        };

        let checks = inner
            .checks
            .iter()
            .map(|(name, (passes, fails))| CheckSummary {
                name: name.clone(),
                passes: *passes,
                fails: *fails,
            })
            .collect();

        Summary {
            requests,
            failures,
            failure_rate: if requests == 0 { 0.0 } else { failures as f64 / requests as f64 },
            iterations: inner.iterations,
            bytes_received,
            min_ms: durations.first().map(|d| ms(*d)).unwrap_or(0.0),
            avg_ms,
            max_ms: durations.last().map(|d| ms(*d)).unwrap_or(0.0),
            p50_ms: ms(percentile(&durations, 50)),
            p90_ms: ms(percentile(&durations, 90)),
            p95_ms: ms(percentile(&durations, 95)),
            p99_ms: ms(percentile(&durations, 99)),
            requests_per_second: if elapsed.is_zero() {
                0.0
            } else {
                requests as f64 / elapsed.as_secs_f64()
            },
            duration_ms: elapsed.as_millis() as u64,
            checks,
        }
    }
}

/// Nearest-rank percentile of sorted values
fn percentile(sorted: &[Duration], p: usize) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let index = (sorted.len() * p).div_ceil(100).saturating_sub(1);
    let index = index.min(sorted.len() - 1);
    sorted[index]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

impl CheckSummary {
    pub fn pass_rate(&self) -> f64 {
        let total = self.passes + self.fails;
        if total == 0 {
            0.0
        } else {
            self.passes as f64 / total as f64
        }
    }
}

/// Aggregated figures of one load run, durations in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub requests: u64,
    pub failures: u64,
    pub failure_rate: f64,
    pub iterations: u64,
    pub bytes_received: u64,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub requests_per_second: f64,
    pub duration_ms: u64,
    pub checks: Vec<CheckSummary>,
}
