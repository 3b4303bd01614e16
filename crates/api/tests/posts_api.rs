//! Controller, service and suite tests against an in-process mock of the
//! posts API.
//!
//! Posts 1 to 100 and users 1 to 10 are read-only fixtures. Created posts get
//! ids from 101 upwards and can be read back, replaced and deleted.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shopcheck_api::validators::response::{validate_array_length, validate_json, validate_success};
use shopcheck_api::{scenarios, ApiClient, ApiClients, DataFactory, ServiceFactory};
use shopcheck_common::{CheckError, Filter, Project, SuiteConfig, SuiteRunner, TestStatus};

const FIXTURE_POSTS: u64 = 100;

#[derive(Default)]
struct Store {
    created: HashMap<u64, Value>,
    next_id: u64,
    next_comment_id: u64,
}

type Shared = Arc<Mutex<Store>>;

fn fixture_post(id: u64) -> Value {
    json!({
        "userId": (id - 1) / 10 + 1,
        "id": id,
        "title": format!("fixture post {}", id),
        "body": "fixture body",
    })
}

async fn list_posts(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let user = query.get("userId").and_then(|v| v.parse::<u64>().ok());
    let posts: Vec<Value> = (1..=FIXTURE_POSTS)
        .map(fixture_post)
        .filter(|p| user.map_or(true, |u| p["userId"] == u))
        .collect();
    Json(Value::Array(posts))
}

async fn get_post(State(store): State<Shared>, Path(id): Path<u64>) -> (StatusCode, Json<Value>) {
    if (1..=FIXTURE_POSTS).contains(&id) {
        return (StatusCode::OK, Json(fixture_post(id)));
    }
    match store.lock().unwrap().created.get(&id) {
        Some(post) => (StatusCode::OK, Json(post.clone())),
        None => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}

async fn create_post(
    State(store): State<Shared>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut store = store.lock().unwrap();
    let id = FIXTURE_POSTS + 1 + store.next_id;
    store.next_id += 1;
    body["id"] = json!(id);
    store.created.insert(id, body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn update_post(
    State(store): State<Shared>,
    Path(id): Path<u64>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    body["id"] = json!(id);
    if (1..=FIXTURE_POSTS).contains(&id) {
        return (StatusCode::OK, Json(body));
    }
    let mut store = store.lock().unwrap();
    match store.created.get_mut(&id) {
        Some(post) => {
            *post = body.clone();
            (StatusCode::OK, Json(body))
        }
        None => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
    }
}

async fn delete_post(State(store): State<Shared>, Path(id): Path<u64>) -> Json<Value> {
    store.lock().unwrap().created.remove(&id);
    Json(json!({}))
}

async fn get_user(Path(id): Path<u64>) -> (StatusCode, Json<Value>) {
    if (1..=10).contains(&id) {
        let user = json!({
            "id": id,
            "name": format!("User {}", id),
            "username": format!("user{}", id),
            "email": format!("user{}@example.com", id),
        });
        (StatusCode::OK, Json(user))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({})))
    }
}

async fn list_users() -> Json<Value> {
    Json(Value::Array((1..=10).map(|id| json!({"id": id})).collect()))
}

async fn create_comment(
    State(store): State<Shared>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut store = store.lock().unwrap();
    store.next_comment_id += 1;
    body["id"] = json!(500 + store.next_comment_id);
    (StatusCode::CREATED, Json(body))
}

async fn list_comments(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let post_id = query.get("postId").and_then(|v| v.parse::<u64>().ok()).unwrap_or(1);
    let comments: Vec<Value> = (1..=5)
        .map(|i| {
            json!({
                "postId": post_id,
                "id": (post_id - 1) * 5 + i,
                "name": "n",
                "email": "e@x.io",
                "body": "b"
            })
        })
        .collect();
    Json(Value::Array(comments))
}

async fn start_mock() -> String {
    let app = Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).put(update_post).delete(delete_post))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/comments", get(list_comments).post(create_comment))
        .with_state(Shared::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn clients(base_url: &str) -> ApiClients {
    ApiClients {
        api: ApiClient::new(base_url, Duration::from_secs(5)).unwrap(),
        llm: ApiClient::new(&format!("{}/v1", base_url), Duration::from_secs(5)).unwrap(),
    }
}

#[tokio::test]
async fn test_controller_reads() {
    let base_url = start_mock().await;
    let clients = clients(&base_url);
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();

    let all = api.get_all_posts().await.unwrap();
    validate_success(&all).unwrap();
    validate_json(&all).unwrap();
    validate_array_length(&all, 100).unwrap();

    let comments = api.get_comments_by_post(7).await.unwrap();
    validate_array_length(&comments, 5).unwrap();
    assert!(comments.value().unwrap()[0]["postId"] == 7);

    assert_eq!(api.get_user_by_id(3).await.unwrap().status(), 200);
    assert_eq!(api.get_user_by_id(999_999).await.unwrap().status(), 404);
    validate_array_length(&api.get_all_users().await.unwrap(), 10).unwrap();
}

#[tokio::test]
async fn test_user_posts_filtered_by_query() {
    let base_url = start_mock().await;
    let clients = clients(&base_url);
    let service = ServiceFactory::from_clients(&clients).create_post_service();

    let result = service.get_and_validate_user_posts(3).await.unwrap();
    assert_eq!(result.posts.len(), 10);
    assert!(result.all_belong_to_user);
    assert!(result.response.url.ends_with("/posts"));
}

#[tokio::test]
async fn test_post_with_comments_workflow() {
    let base_url = start_mock().await;
    let clients = clients(&base_url);
    let service = ServiceFactory::from_clients(&clients).create_post_service();

    let result = service.create_post_with_comments(4).await.unwrap();
    let post_id = result.post.id.unwrap();
    assert!(post_id > FIXTURE_POSTS);
    assert!(result.post.title.starts_with("Test Post Title"));
    assert_eq!(result.post_response.status(), 201);

    assert_eq!(result.comments.len(), 4);
    assert!(result.comments.iter().all(|c| c.post_id == post_id && c.id.is_some()));
    assert!(result.comment_responses.iter().all(|r| r.status() == 201));
}

#[tokio::test]
async fn test_update_then_cleanup() {
    let base_url = start_mock().await;
    let clients = clients(&base_url);
    let service = ServiceFactory::from_clients(&clients).create_post_service();

    let result = service.create_update_and_verify_post().await.unwrap();
    let id = result.original.id.unwrap();
    assert_eq!(result.updated.id, Some(id));
    assert_eq!(result.update_response.status(), 200);
    assert_eq!(
        result.verify_response.value().unwrap()["title"],
        json!(result.updated.title)
    );

    let cleanup = service.cleanup_post(id).await.unwrap();
    assert_eq!(cleanup.verify_response.status(), 404);

    // A fixture post never disappears, so verifying its removal fails
    let err = service.cleanup_post(1).await.unwrap_err();
    assert!(err.is_assertion());
}

#[tokio::test]
async fn test_bulk_posts_keep_forced_user() {
    let base_url = start_mock().await;
    let clients = clients(&base_url);
    let service = ServiceFactory::from_clients(&clients).create_post_service();

    let result = service.create_user_posts(42, 10).await.unwrap();
    assert_eq!(result.posts.len(), 10);
    assert!(result.posts.iter().all(|p| p.user_id == 42));

    let mut ids: Vec<u64> = result.posts.iter().filter_map(|p| p.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn test_unpersisted_update_reports_server_error() {
    let base_url = start_mock().await;
    let clients = clients(&base_url);
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();

    let response = api.update_post(5000, &DataFactory::create_post()).await.unwrap();
    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let err = client.get("posts").await.unwrap_err();
    assert!(matches!(err, CheckError::Http(_)), "{:?}", err);
}

#[tokio::test]
async fn test_rest_suite_passes_against_mock() {
    let base_url = start_mock().await;

    let mut config = SuiteConfig::default();
    config.api.base_url = base_url;
    config.run.output_dir = std::env::temp_dir().join("shopcheck-api-suite");

    let filter = Filter {
        project: Some(Project::Api),
        ..Default::default()
    };
    let result = SuiteRunner::new(Arc::new(config))
        .run(scenarios::all(), &filter)
        .await;

    let failures: Vec<String> = result
        .results
        .iter()
        .filter(|r| r.status == TestStatus::Failed)
        .map(|r| format!("{}: {:?}", r.title(), r.error))
        .collect();
    assert!(failures.is_empty(), "{:#?}", failures);
    assert_eq!(result.total, 14);
    assert_eq!(result.passed, 14);
}

#[test]
fn test_registered_cases() {
    let cases = scenarios::all();
    let rest: Vec<_> = cases.iter().filter(|c| c.project == Project::Api).collect();
    let local: Vec<_> = cases.iter().filter(|c| c.project == Project::LocalApi).collect();

    assert_eq!(rest.len(), 14);
    assert_eq!(local.len(), 26);
    assert_eq!(rest.iter().filter(|c| c.has_tag("@negative")).count(), 3);
    assert_eq!(local.iter().filter(|c| c.has_tag("@local")).count(), 20);
    assert_eq!(local.iter().filter(|c| c.has_tag("@demo")).count(), 6);
    assert!(cases.iter().all(|c| !c.skip));
}
