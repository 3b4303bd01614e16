//! Pass/fail gates evaluated against a run summary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::metrics::Summary;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// 95th percentile request duration must stay below this
    pub p95: Option<Duration>,
    /// Failed requests / all requests must stay below this
    pub max_failure_rate: Option<f64>,
    /// More than this many requests must be made
    pub min_requests: Option<u64>,
}

impl Thresholds {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.p95.is_none() && self.max_failure_rate.is_none() && self.min_requests.is_none()
    }

    pub fn evaluate(&self, summary: &Summary) -> Vec<ThresholdViolation> {
        let mut violations = Vec::new();

        if let Some(p95) = self.p95 {
            let limit = p95.as_millis() as f64;
            if summary.p95_ms >= limit {
                violations.push(ThresholdViolation {
                    metric: "http_req_duration".to_string(),
                    expected: format!("p(95)<{}", limit),
                    actual: format!("{:.2}", summary.p95_ms),
                });
            }
        }

        if let Some(rate) = self.max_failure_rate {
            if summary.failure_rate >= rate {
                violations.push(ThresholdViolation {
                    metric: "http_req_failed".to_string(),
                    expected: format!("rate<{}", rate),
                    actual: format!("{:.4}", summary.failure_rate),
                });
            }
        }

        if let Some(count) = self.min_requests {
            if summary.requests <= count {
                violations.push(ThresholdViolation {
                    metric: "http_reqs".to_string(),
                    expected: format!("count>{}", count),
                    actual: summary.requests.to_string(),
                });
            }
        }

        violations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdViolation {
    pub metric: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for ThresholdViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.metric, self.expected, self.actual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Metrics, Sample};

    fn summary(ms: u64, failed_every: u64, count: u64) -> Summary {
        let metrics = Metrics::new();
        for i in 0..count {
            let status = if failed_every > 0 && i % failed_every == 0 { 500 } else { 200 };
            metrics.record(Sample {
                duration: Duration::from_millis(ms),
                status: Some(status),
                bytes: 0,
            });
        }
        metrics.summary(Duration::from_secs(30))
    }

    fn gates() -> Thresholds {
        Thresholds {
            p95: Some(Duration::from_millis(500)),
            max_failure_rate: Some(0.01),
            min_requests: Some(50),
        }
    }

    #[test]
    fn test_healthy_run_passes() {
        assert!(gates().evaluate(&summary(120, 0, 300)).is_empty());
        assert!(Thresholds::none().evaluate(&summary(5000, 1, 1)).is_empty());
    }

    #[test]
    fn test_each_gate_reports() {
        let slow = gates().evaluate(&summary(800, 0, 300));
        assert_eq!(slow.len(), 1);
        assert_eq!(slow[0].metric, "http_req_duration");
        assert_eq!(slow[0].to_string(), "http_req_duration: expected p(95)<500, got 800.00");

        let failing = gates().evaluate(&summary(100, 10, 300));
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].metric, "http_req_failed");

        // Exactly 50 requests is not more than 50
        let sparse = gates().evaluate(&summary(100, 0, 50));
        assert_eq!(sparse.len(), 1);
        assert_eq!(sparse[0].expected, "count>50");
    }
}
