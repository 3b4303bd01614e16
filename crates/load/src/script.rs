//! Declarative load scripts
//!
//! A script is a profile plus the steps one iteration performs. Each step
//! issues one request, runs its checks against the response and then waits
//! its think time.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;

use crate::profile::LoadProfile;
use crate::thresholds::Thresholds;

/// Which path a step requests
#[derive(Debug, Clone)]
pub enum Target {
    Path(String),
    /// One of these, chosen at random every iteration
    RandomOf(Vec<String>),
}

impl Target {
    pub fn pick(&self) -> &str {
        match self {
            Target::Path(path) => path,
            Target::RandomOf(paths) => paths
                .choose(&mut rand::thread_rng())
                .map(String::as_str)
                .unwrap_or("/"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Text(String),
    /// A parameterised query with a fresh random id every iteration
    RandomQuery { query: String, max_param: u32 },
}

impl Payload {
    /// Body text and content type for one request
    pub fn render(&self) -> (String, &'static str) {
        match self {
            Payload::Json(value) => (value.to_string(), "application/json"),
            Payload::Text(text) => (text.clone(), "text/plain"),
            Payload::RandomQuery { query, max_param } => {
                let param = rand::thread_rng().gen_range(0..*max_param);
                (json!({"query": query, "params": [param]}).to_string(), "application/json")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum CheckKind {
    Status(u16),
    StatusOneOf(Vec<u16>),
    FasterThan(Duration),
    /// Body is JSON with at least one of these top-level keys
    JsonHasAny(Vec<String>),
    BodyNotEmpty,
}

/// A named assertion whose pass/fail counts are reported but which never
/// aborts the iteration
#[derive(Debug, Clone)]
pub struct Check {
    pub name: String,
    pub kind: CheckKind,
}

impl Check {
    pub fn new(name: &str, kind: CheckKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }

    pub fn evaluate(&self, response: &Observed<'_>) -> bool {
        match &self.kind {
            CheckKind::Status(status) => response.status == Some(*status),
            CheckKind::StatusOneOf(statuses) => {
                response.status.is_some_and(|s| statuses.contains(&s))
            }
            CheckKind::FasterThan(limit) => response.duration < *limit,
            CheckKind::JsonHasAny(keys) => serde_json::from_slice::<Value>(response.body)
                .map(|body| keys.iter().any(|k| body.get(k).is_some()))
                .unwrap_or(false),
            CheckKind::BodyNotEmpty => !response.body.is_empty(),
        }
    }
}

/// What a check gets to see of one request
#[derive(Debug, Clone, Copy)]
pub struct Observed<'a> {
    pub status: Option<u16>,
    pub duration: Duration,
    pub body: &'a [u8],
}

#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    pub method: Method,
    pub target: Target,
    pub payload: Option<Payload>,
    pub checks: Vec<Check>,
    /// Pause after this step, falling back to the script's think time
    pub think_time: Option<Duration>,
}

impl Step {
    pub fn get(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            method: Method::GET,
            target: Target::Path(path.to_string()),
            payload: None,
            checks: Vec::new(),
            think_time: None,
        }
    }

    pub fn get_any(name: &str, paths: &[&str]) -> Self {
        Self {
            target: Target::RandomOf(paths.iter().map(|p| p.to_string()).collect()),
            ..Self::get(name, "/")
        }
    }

    pub fn post(name: &str, path: &str, payload: Payload) -> Self {
        Self {
            method: Method::POST,
            payload: Some(payload),
            ..Self::get(name, path)
        }
    }

    pub fn check(mut self, name: &str, kind: CheckKind) -> Self {
        self.checks.push(Check::new(name, kind));
        self
    }
}

#[derive(Debug, Clone)]
pub struct LoadScript {
    pub name: &'static str,
    pub description: &'static str,
    pub base_url: String,
    pub profile: LoadProfile,
    pub thresholds: Thresholds,
    /// Default pause after every step
    pub think_time: Duration,
    pub steps: Vec<Step>,
}

impl LoadScript {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_profile(mut self, profile: LoadProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    pub fn url(&self, path: &str) -> String {
        if path == "/" {
            format!("{}/", self.base_url)
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(status: u16, body: &[u8]) -> Observed<'_> {
        Observed {
            status: Some(status),
            duration: Duration::from_millis(120),
            body,
        }
    }

    #[test]
    fn test_checks() {
        let fact = br#"{"fact": "Cats sleep a lot", "length": 16}"#;
        let status_200 = Check::new("status is 200", CheckKind::Status(200));
        assert!(status_200.evaluate(&observed(200, fact)));
        assert!(!status_200.evaluate(&observed(404, fact)));

        let tolerated = Check::new("ok", CheckKind::StatusOneOf(vec![200, 404]));
        assert!(tolerated.evaluate(&observed(404, b"")));

        let within = |ms| Check::new("fast", CheckKind::FasterThan(Duration::from_millis(ms)));
        assert!(within(500).evaluate(&observed(200, fact)));
        assert!(!within(100).evaluate(&observed(200, fact)));

        let keys = vec!["fact".into(), "data".into()];
        let has_data = Check::new("has data", CheckKind::JsonHasAny(keys));
        assert!(has_data.evaluate(&observed(200, fact)));
        assert!(!has_data.evaluate(&observed(200, b"<html></html>")));

        let no_response = Observed {
            status: None,
            duration: Duration::ZERO,
            body: b"",
        };
        assert!(!Check::new("ok", CheckKind::StatusOneOf(vec![200])).evaluate(&no_response));
        assert!(!Check::new("body", CheckKind::BodyNotEmpty).evaluate(&no_response));
    }

    #[test]
    fn test_random_query_payload() {
        let payload = Payload::RandomQuery {
            query: "SELECT * FROM users WHERE id = ?".into(),
            max_param: 100,
        };
        let (body, content_type) = payload.render();
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(content_type, "application/json");
        assert!(value["params"][0].as_u64().unwrap() < 100);
    }

    #[test]
    fn test_random_target_stays_in_set() {
        let step = Step::get_any("endpoint", &["/fact", "/facts"]);
        for _ in 0..20 {
            assert!(["/fact", "/facts"].contains(&step.target.pick()));
        }
    }
}
