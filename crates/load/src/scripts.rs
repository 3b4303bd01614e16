//! The bundled load scripts

use std::time::Duration;

use shopcheck_common::{CheckError, CheckResult};

use crate::profile::{LoadProfile, Stage};
use crate::script::{CheckKind, LoadScript, Payload, Step};
use crate::thresholds::Thresholds;

const CAT_FACTS: &str = "https://catfact.ninja";
const K6_TEST: &str = "http://test.k6.io";
const HTTPBIN: &str = "https://httpbin.org";

const THINK_TIME: Duration = Duration::from_secs(1);

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn mins(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

fn script(
    name: &'static str,
    description: &'static str,
    base_url: &str,
    profile: LoadProfile,
    steps: Vec<Step>,
) -> LoadScript {
    LoadScript {
        name,
        description,
        base_url: base_url.to_string(),
        profile,
        thresholds: Thresholds::none(),
        think_time: THINK_TIME,
        steps,
    }
}

pub fn api_load() -> LoadScript {
    script(
        "api-load",
        "Concurrent requests against one API endpoint",
        CAT_FACTS,
        LoadProfile::constant(10, secs(30)),
        vec![Step::get("fact", "/fact")],
    )
}

pub fn spike() -> LoadScript {
    let stages = vec![
        Stage::new(secs(10), 100),
        Stage::new(mins(1), 100),
        Stage::new(secs(10), 500),
        Stage::new(mins(3), 500),
        Stage::new(secs(10), 100),
        Stage::new(mins(3), 100),
        Stage::new(secs(10), 0),
    ];
    script(
        "spike",
        "Sudden jumps in traffic and the recovery after them",
        K6_TEST,
        LoadProfile::ramping(stages),
        vec![Step::get("home", "/")],
    )
}

pub fn soak() -> LoadScript {
    script(
        "soak",
        "Sustained load for an hour to surface slow degradation",
        K6_TEST,
        LoadProfile::constant(50, mins(60)),
        vec![Step::get("home", "/")],
    )
}

pub fn stress() -> LoadScript {
    let stages = vec![
        Stage::new(mins(2), 100),
        Stage::new(mins(5), 200),
        Stage::new(mins(2), 300),
        Stage::new(mins(5), 400),
        Stage::new(mins(2), 500),
        Stage::new(mins(5), 0),
    ];
    script(
        "stress",
        "Stepwise ramp from 100 to 500 VUs to find the breaking point",
        K6_TEST,
        LoadProfile::ramping(stages),
        vec![Step::get("home", "/")],
    )
}

pub fn threshold() -> LoadScript {
    let mut script = script(
        "threshold",
        "Fails when p95 latency, error rate or throughput miss their targets",
        CAT_FACTS,
        LoadProfile::constant(10, secs(30)),
        vec![Step::get("fact", "/fact")
            .check("status is 200", CheckKind::Status(200))
            .check("response time < 500ms", CheckKind::FasterThan(Duration::from_millis(500)))
            .check("response has fact", CheckKind::JsonHasAny(vec!["fact".into()]))],
    );
    script.thresholds = Thresholds {
        p95: Some(Duration::from_millis(500)),
        max_failure_rate: Some(0.01),
        min_requests: Some(50),
    };
    script
}

pub fn user_journey() -> LoadScript {
    script(
        "user-journey",
        "Each VU walks home, about and contact pages in order",
        K6_TEST,
        LoadProfile::constant(10, secs(30)),
        vec![
            Step::get("home", "/").check("home page loaded", CheckKind::Status(200)),
            Step::get("about", "/about.php").check("about page loaded", CheckKind::Status(200)),
            Step::get("contact", "/contact.php")
                .check("contact page loaded", CheckKind::Status(200)),
        ],
    )
}

pub fn endpoint_response_time() -> LoadScript {
    script(
        "endpoint-response-time",
        "Latency distribution across randomly chosen endpoints",
        CAT_FACTS,
        LoadProfile::constant(5, secs(20)),
        vec![Step::get_any("endpoint", &["/fact", "/facts", "/facts?max_length=100"])
            .check("status is 200", CheckKind::Status(200))
            .check("response time < 500ms", CheckKind::FasterThan(Duration::from_millis(500)))
            .check("response has data", CheckKind::JsonHasAny(vec!["fact".into(), "data".into()]))],
    )
}

pub fn database_performance() -> LoadScript {
    let query = Payload::RandomQuery {
        query: "SELECT * FROM users WHERE id = ?".to_string(),
        max_param: 100,
    };
    let fast = CheckKind::FasterThan(Duration::from_millis(200));
    script(
        "database-performance",
        "Simulated query load posted as JSON",
        CAT_FACTS,
        LoadProfile::constant(20, secs(30)),
        vec![Step::post("query", "/fact", query)
            .check("query executed successfully", CheckKind::StatusOneOf(vec![200, 404]))
            .check("query response time < 200ms", fast)],
    )
}

pub fn file_transfer() -> LoadScript {
    let upload = format!("This is a test file content for upload testing {}", "x".repeat(1000));
    script(
        "file-transfer",
        "Upload a text body, then download 1 KiB",
        HTTPBIN,
        LoadProfile::constant(5, secs(20)),
        vec![
            Step {
                think_time: Some(Duration::ZERO),
                ..Step::post("upload", "/post", Payload::Text(upload))
                    .check("upload successful", CheckKind::Status(200))
                    .check(
                        "upload response contains data",
                        CheckKind::JsonHasAny(vec!["data".into()]),
                    )
            },
            Step::get("download", "/bytes/1024")
                .check("download successful", CheckKind::Status(200))
                .check("download size > 0", CheckKind::BodyNotEmpty),
        ],
    )
}

pub fn all() -> Vec<LoadScript> {
    vec![
        api_load(),
        spike(),
        soak(),
        stress(),
        threshold(),
        user_journey(),
        endpoint_response_time(),
        database_performance(),
        file_transfer(),
    ]
}

pub fn by_name(name: &str) -> CheckResult<LoadScript> {
    all()
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let known: Vec<&str> = all().iter().map(|s| s.name).collect();
            CheckError::Load(format!(
                "unknown load script '{}' (known: {})",
                name,
                known.join(", ")
            ))
        })
}
