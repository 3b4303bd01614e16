//! Executor tests against an in-process HTTP server

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shopcheck_load::{scripts, LoadProfile, LoadRunner, LoadScript, Stage, Thresholds};

async fn start_server(hits: Arc<AtomicUsize>) -> String {
    let counter = Arc::clone(&hits);
    let app = Router::new()
        .route(
            "/fact",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"fact": "Cats sleep 70% of their lives.", "length": 30}))
                }
            })
            .post(|| async { (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))) }),
        )
        .route("/facts", get(|| async { Json(json!({"data": [], "current_page": 1})) }))
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/post", post(|body: String| async move { Json(json!({"data": body})) }))
        .route("/bytes/:n", get(|| async { vec![7u8; 1024] }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn short(script: LoadScript, base_url: &str, vus: usize) -> LoadScript {
    script
        .with_base_url(base_url)
        .with_profile(LoadProfile::constant(vus, Duration::from_millis(600)))
        .with_think_time(Duration::from_millis(20))
}

#[tokio::test]
async fn test_threshold_script_passes_on_fast_server() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base_url = start_server(Arc::clone(&hits)).await;

    let mut script = short(scripts::threshold(), &base_url, 3);
    script.thresholds.min_requests = Some(5);

    let runner = LoadRunner::new().unwrap().with_tick(Duration::from_millis(50));
    let report = runner.run(&script).await.unwrap();

    assert!(report.passed(), "{:?}", report.violations);
    assert_eq!(report.max_vus, 3);
    assert!(report.summary.requests > 5);
    assert_eq!(report.summary.failures, 0);
    assert_eq!(hits.load(Ordering::SeqCst) as u64, report.summary.requests);

    assert_eq!(report.summary.checks.len(), 3);
    for check in &report.summary.checks {
        assert_eq!(check.fails, 0, "{}", check.name);
        assert_eq!(check.passes, report.summary.requests, "{}", check.name);
    }
}

#[tokio::test]
async fn test_failures_cross_thresholds() {
    let base_url = start_server(Arc::new(AtomicUsize::new(0))).await;

    let mut script = short(scripts::api_load(), &base_url, 2);
    script.steps[0] = shopcheck_load::Step::get("broken", "/broken");
    script.thresholds = Thresholds {
        max_failure_rate: Some(0.01),
        min_requests: Some(100_000),
        ..Default::default()
    };

    let report = LoadRunner::new().unwrap().run(&script).await.unwrap();
    assert!(!report.passed());
    assert_eq!(report.summary.failure_rate, 1.0);

    let metrics: Vec<&str> = report.violations.iter().map(|v| v.metric.as_str()).collect();
    assert_eq!(metrics, vec!["http_req_failed", "http_reqs"]);
}

#[tokio::test]
async fn test_multi_step_scripts() {
    let base_url = start_server(Arc::new(AtomicUsize::new(0))).await;
    let runner = LoadRunner::new().unwrap();

    let transfer = runner.run(&short(scripts::file_transfer(), &base_url, 2)).await.unwrap();
    assert!(transfer.summary.iterations > 0);
    assert_eq!(transfer.summary.failures, 0);
    assert!(transfer.summary.checks.iter().all(|c| c.fails == 0), "{:?}", transfer.summary.checks);
    assert!(transfer.summary.bytes_received >= 1024);

    let endpoints = runner
        .run(&short(scripts::endpoint_response_time(), &base_url, 2))
        .await
        .unwrap();
    let has_data = endpoints
        .summary
        .checks
        .iter()
        .find(|c| c.name == "response has data")
        .unwrap();
    assert_eq!(has_data.fails, 0);

    // The query endpoint answers POST with 404, which the script tolerates
    let database = runner.run(&short(scripts::database_performance(), &base_url, 2)).await.unwrap();
    let executed = database
        .summary
        .checks
        .iter()
        .find(|c| c.name == "query executed successfully")
        .unwrap();
    assert_eq!(executed.fails, 0);
    assert_eq!(database.summary.failure_rate, 1.0);
}

#[tokio::test]
async fn test_ramping_profile_reaches_target() {
    let base_url = start_server(Arc::new(AtomicUsize::new(0))).await;
    let script = scripts::api_load()
        .with_base_url(&base_url)
        .with_think_time(Duration::from_millis(10))
        .with_profile(LoadProfile::ramping(vec![
            Stage::new(Duration::from_millis(300), 4),
            Stage::new(Duration::from_millis(300), 4),
            Stage::new(Duration::from_millis(200), 0),
        ]));

    let report = LoadRunner::new()
        .unwrap()
        .with_tick(Duration::from_millis(20))
        .run(&script)
        .await
        .unwrap();

    assert_eq!(report.max_vus, 4);
    assert!(report.summary.requests > 0);
    assert!(report.summary.duration_ms >= 800);
}

#[tokio::test]
async fn test_invalid_script_rejected() {
    let script = scripts::api_load().with_profile(LoadProfile::constant(0, Duration::from_secs(1)));
    let err = LoadRunner::new().unwrap().run(&script).await.unwrap_err();
    assert!(err.to_string().contains("never starts"));
}
