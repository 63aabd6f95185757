//! Integration tests for Todo API endpoints.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::page::EmbeddedPages;
use crate::api::{AppState, RouterOptions, create_router};
use crate::db::{
    Database, DbError, DbResult, SurrealDatabase, Todo, TodoPatch, TodoRepository,
};

/// Create a test app with an in-memory database
async fn test_app() -> axum::Router {
    let db = SurrealDatabase::in_memory().await.unwrap();
    create_router(AppState::new(db, EmbeddedPages), &RouterOptions::default())
}

/// Helper to parse JSON response body
async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn list(app: &axum::Router) -> Vec<Value> {
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/todo/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["data"]
        .as_array()
        .unwrap()
        .clone()
}

async fn create(app: &axum::Router, title: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/todo/", json!({"title": title})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["data"].clone()
}

// =============================================================================
// List
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn list_todos_empty() {
    let app = test_app().await;
    assert!(list(&app).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn list_todos_returns_every_created_item() {
    let app = test_app().await;

    let mut created = Vec::new();
    for title in ["a", "b", "c", "d"] {
        created.push(create(&app, title).await);
    }

    let listed = list(&app).await;
    assert_eq!(listed.len(), created.len());
    for item in &created {
        let matches: Vec<_> = listed.iter().filter(|t| t["id"] == item["id"]).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0], item);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn todo_routes_answer_with_and_without_trailing_slash() {
    let app = test_app().await;

    for uri in ["/todo", "/todo/"] {
        let response = app
            .clone()
            .oneshot(empty_request("GET", uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn create_todo_returns_201_with_generated_fields() {
    let app = test_app().await;
    let before = Utc::now();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/todo/", json!({"title": "buy milk"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    let data = &body["data"];
    assert!(!data["id"].as_str().unwrap().is_empty());
    assert_eq!(data["title"], "buy milk");
    assert_eq!(data["completed"], false);

    let created_at: DateTime<Utc> = data["createdAt"].as_str().unwrap().parse().unwrap();
    assert!((created_at - before).num_seconds().abs() < 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_todo_ignores_client_supplied_id_and_completed() {
    let app = test_app().await;

    let data = {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/todo/",
                json!({"id": "mine", "title": "x", "completed": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["data"].clone()
    };

    assert_ne!(data["id"], "mine");
    assert_eq!(data["completed"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_todo_rejects_empty_or_missing_title() {
    let app = test_app().await;

    for body in [json!({"title": ""}), json!({"title": "   "}), json!({})] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/todo/", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");

        let envelope = json_body(response).await;
        assert_eq!(envelope["message"], "malformed request");
        assert!(envelope["error"].is_string());
    }

    assert!(list(&app).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn create_todo_rejects_malformed_json() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/todo/")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "malformed request");

    // Wrong field type
    let response = app
        .clone()
        .oneshot(json_request("POST", "/todo/", json!({"title": 42})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No JSON content type
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/todo/")
                .body(Body::from(r#"{"title":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(list(&app).await.is_empty());
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn update_todo_title_keeps_id_and_created_at() {
    let app = test_app().await;
    let created = create(&app, "old title").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/todo/",
            json!({"id": created["id"], "title": "new title"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"message": "updated"}));

    let listed = list(&app).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], created["id"]);
    assert_eq!(listed[0]["createdAt"], created["createdAt"]);
    assert_eq!(listed[0]["title"], "new title");
    assert_eq!(listed[0]["completed"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_todo_ignores_created_at_in_body() {
    let app = test_app().await;
    let created = create(&app, "fixed timestamp").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/todo/",
            json!({
                "id": created["id"],
                "createdAt": "2001-01-01T00:00:00Z",
                "completed": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = list(&app).await;
    assert_eq!(listed[0]["createdAt"], created["createdAt"]);
    assert_eq!(listed[0]["completed"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_todo_requires_id() {
    let app = test_app().await;

    for body in [json!({"title": "x"}), json!({"id": "", "completed": true})] {
        let response = app
            .clone()
            .oneshot(json_request("PUT", "/todo/", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn update_todo_rejects_empty_title() {
    let app = test_app().await;
    let created = create(&app, "keep").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/todo/",
            json!({"id": created["id"], "title": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(list(&app).await[0]["title"], "keep");
}

#[tokio::test(flavor = "multi_thread")]
async fn update_todo_unknown_id_is_404_and_touches_nothing() {
    let app = test_app().await;
    let created = create(&app, "bystander").await;

    for id in ["nope", "not a real id", "todo:nope"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/todo/",
                json!({"id": id, "title": "hijacked", "completed": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "id {id}");
        assert_eq!(json_body(response).await["message"], "todo not found");
    }

    assert_eq!(list(&app).await, vec![created]);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn delete_todo_by_query_param() {
    let app = test_app().await;
    let created = create(&app, "bye").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/todo/?id={id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"message": "deleted"}));

    assert!(list(&app).await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_todo_by_body_then_again_is_404() {
    let app = test_app().await;
    let gone = create(&app, "gone").await;
    let kept = create(&app, "kept").await;

    let response = app
        .clone()
        .oneshot(json_request("DELETE", "/todo/", json!({"id": gone["id"]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request("DELETE", "/todo/", json!({"id": gone["id"]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(list(&app).await, vec![kept]);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_todo_query_param_wins_over_body() {
    let app = test_app().await;
    let target = create(&app, "target").await;
    let other = create(&app, "other").await;
    let id = target["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/todo/?id={id}"),
            json!({"id": other["id"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(list(&app).await, vec![other]);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_todo_requires_id() {
    let app = test_app().await;

    let requests = [
        empty_request("DELETE", "/todo/"),
        empty_request("DELETE", "/todo/?id="),
        json_request("DELETE", "/todo/", json!({})),
        json_request("DELETE", "/todo/", json!({"id": "  "})),
    ];
    for request in requests {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "malformed request");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_todo_rejects_malformed_body() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/todo/")
                .header("content-type", "application/json")
                .body(Body::from("{id:"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_todo_unknown_id_is_404() {
    let app = test_app().await;
    let kept = create(&app, "kept").await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/todo/?id=missing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(list(&app).await, vec![kept]);
}

// =============================================================================
// Full lifecycle
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn todo_crud_lifecycle() {
    let app = test_app().await;

    // create
    let created = create(&app, "a").await;
    let id = created["id"].clone();

    // complete it
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/todo/",
            json!({"id": id, "completed": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // list shows it completed
    let listed = list(&app).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], id);
    assert_eq!(listed[0]["title"], "a");
    assert_eq!(listed[0]["completed"], true);

    // delete
    let response = app
        .clone()
        .oneshot(json_request("DELETE", "/todo/", json!({"id": id})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // gone
    assert!(list(&app).await.is_empty());
}

// =============================================================================
// Storage failures
// =============================================================================

/// Backend whose every call times out.
struct UnavailableDatabase;

struct UnavailableTodos;

fn unavailable() -> DbError {
    DbError::Timeout {
        after: Duration::from_secs(10),
    }
}

impl TodoRepository for UnavailableTodos {
    async fn list(&self) -> DbResult<Vec<Todo>> {
        Err(unavailable())
    }

    async fn create(&self, _title: &str) -> DbResult<Todo> {
        Err(unavailable())
    }

    async fn update(&self, _id: &str, _patch: &TodoPatch) -> DbResult<()> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &str) -> DbResult<()> {
        Err(unavailable())
    }
}

impl Database for UnavailableDatabase {
    type Todos<'a> = UnavailableTodos;

    fn todos(&self) -> Self::Todos<'_> {
        UnavailableTodos
    }
}

fn unavailable_app() -> axum::Router {
    create_router(
        AppState::new(UnavailableDatabase, EmbeddedPages),
        &RouterOptions::default(),
    )
}

#[tokio::test]
async fn storage_failure_is_500_with_error_envelope() {
    let app = unavailable_app();

    let cases = [
        (empty_request("GET", "/todo/"), "failed to fetch todos"),
        (
            json_request("POST", "/todo/", json!({"title": "x"})),
            "failed to save todo",
        ),
        (
            json_request("PUT", "/todo/", json!({"id": "abc", "completed": true})),
            "failed to update todo",
        ),
        (
            empty_request("DELETE", "/todo/?id=abc"),
            "failed to delete todo",
        ),
    ];

    for (request, message) in cases {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({
                "message": message,
                "error": "Database did not respond within 10s"
            })
        );
    }
}

#[tokio::test]
async fn validation_runs_before_storage() {
    let app = unavailable_app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/todo/", json!({"title": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/todo/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Request timeout
// =============================================================================

/// Backend that never answers within a test's patience.
struct StalledDatabase;

struct StalledTodos;

async fn stall<T>() -> DbResult<T> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Err(unavailable())
}

impl TodoRepository for StalledTodos {
    async fn list(&self) -> DbResult<Vec<Todo>> {
        stall().await
    }

    async fn create(&self, _title: &str) -> DbResult<Todo> {
        stall().await
    }

    async fn update(&self, _id: &str, _patch: &TodoPatch) -> DbResult<()> {
        stall().await
    }

    async fn delete(&self, _id: &str) -> DbResult<()> {
        stall().await
    }
}

impl Database for StalledDatabase {
    type Todos<'a> = StalledTodos;

    fn todos(&self) -> Self::Todos<'_> {
        StalledTodos
    }
}

#[tokio::test]
async fn slow_request_is_408_with_error_envelope() {
    let app = create_router(
        AppState::new(StalledDatabase, EmbeddedPages),
        &RouterOptions {
            request_timeout: Duration::from_millis(100),
            ..RouterOptions::default()
        },
    );

    let started = std::time::Instant::now();
    let response = app.oneshot(empty_request("GET", "/todo/")).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(
        response.headers()[axum::http::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    assert_eq!(
        json_body(response).await,
        json!({
            "message": "request timed out",
            "error": "Request did not complete in time"
        })
    );
}
