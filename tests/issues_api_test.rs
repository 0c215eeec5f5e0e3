//! Functional tests for the issues REST API.
//!
//! Drives the real router with in-process requests against an in-memory
//! SQLite database. Every response carries status 200; logical failure is
//! visible only in the body shape.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use issue_tracker::adapters::sqlite::{all_embedded_migrations, create_test_pool, Migrator};
use issue_tracker::{IssueService, IssuesHttpConfig, IssuesHttpServer, SqliteIssueRepository};

async fn test_app() -> Router {
    let pool = create_test_pool().await.unwrap();
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .unwrap();
    let service = IssueService::new(Arc::new(SqliteIssueRepository::new(pool)));
    IssuesHttpServer::new(service, IssuesHttpConfig::default()).into_router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

async fn create_issue(app: &Router, project: &str, body: Value) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        &format!("/api/issues/{project}"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn create_issue_with_every_field() {
    let app = test_app().await;

    let body = create_issue(
        &app,
        "apitest",
        json!({
            "issue_title": "Title",
            "issue_text": "Text",
            "created_by": "Tester",
            "assigned_to": "Chai and Mocha",
            "status_text": "In QA"
        }),
    )
    .await;

    assert_eq!(body["issue_title"], "Title");
    assert_eq!(body["issue_text"], "Text");
    assert_eq!(body["created_by"], "Tester");
    assert_eq!(body["assigned_to"], "Chai and Mocha");
    assert_eq!(body["status_text"], "In QA");
    assert_eq!(body["open"], true);
    assert_eq!(body["project"], "apitest");
    assert!(body["_id"].is_string());
    assert!(body["created_on"].is_string());
    assert!(body["updated_on"].is_string());
}

#[tokio::test]
async fn create_issue_with_only_required_fields() {
    let app = test_app().await;

    let body = create_issue(
        &app,
        "apitest",
        json!({
            "issue_title": "Title",
            "issue_text": "Text",
            "created_by": "Tester"
        }),
    )
    .await;

    assert_eq!(body["assigned_to"], "");
    assert_eq!(body["status_text"], "");
    assert_eq!(body["open"], true);
    assert!(body["_id"].is_string());
}

#[tokio::test]
async fn create_issue_with_missing_required_fields() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/issues/apitest",
        Some(json!({"issue_title": "Title"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "required field(s) missing"}));

    // An empty required field counts as missing too, and nothing is stored.
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/issues/apitest",
        Some(json!({"issue_title": "Title", "issue_text": "", "created_by": "Tester"})),
    )
    .await;
    assert_eq!(body, json!({"error": "required field(s) missing"}));

    let (_, body) = send(&app, Method::GET, "/api/issues/apitest", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn view_issues_on_a_project() {
    let app = test_app().await;
    for title in ["First", "Second"] {
        create_issue(
            &app,
            "fullview",
            json!({"issue_title": title, "issue_text": "Text", "created_by": "Tester"}),
        )
        .await;
    }
    create_issue(
        &app,
        "elsewhere",
        json!({"issue_title": "Other", "issue_text": "Text", "created_by": "Tester"}),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/issues/fullview", None).await;

    assert_eq!(status, StatusCode::OK);
    let issues = body.as_array().unwrap();
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i["project"] == "fullview"));
}

#[tokio::test]
async fn view_issues_with_one_filter() {
    let app = test_app().await;
    let created = create_issue(
        &app,
        "filtered",
        json!({"issue_title": "Open one", "issue_text": "Text", "created_by": "Tester"}),
    )
    .await;
    let closed = create_issue(
        &app,
        "filtered",
        json!({"issue_title": "Closed one", "issue_text": "Text", "created_by": "Tester"}),
    )
    .await;
    send(
        &app,
        Method::PUT,
        "/api/issues/filtered",
        Some(json!({"_id": closed["_id"], "open": false})),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/api/issues/filtered?open=true", None).await;
    let issues = body.as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["_id"], created["_id"]);

    let (_, body) = send(&app, Method::GET, "/api/issues/filtered?open=false", None).await;
    let issues = body.as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["_id"], closed["_id"]);
}

#[tokio::test]
async fn view_issues_with_multiple_filters() {
    let app = test_app().await;
    create_issue(
        &app,
        "multifilter",
        json!({"issue_title": "Mine", "issue_text": "Text", "created_by": "Tester"}),
    )
    .await;
    create_issue(
        &app,
        "multifilter",
        json!({"issue_title": "Theirs", "issue_text": "Text", "created_by": "Someone"}),
    )
    .await;

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/issues/multifilter?open=true&created_by=Tester",
        None,
    )
    .await;

    let issues = body.as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["issue_title"], "Mine");
}

#[tokio::test]
async fn unknown_filter_field_yields_empty_result() {
    let app = test_app().await;
    create_issue(
        &app,
        "apitest",
        json!({"issue_title": "Title", "issue_text": "Text", "created_by": "Tester"}),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/issues/apitest?severity=high",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn update_one_field_on_an_issue() {
    let app = test_app().await;
    let created = create_issue(
        &app,
        "apitest",
        json!({"issue_title": "Title", "issue_text": "Text", "created_by": "Tester"}),
    )
    .await;
    let id = created["_id"].as_str().unwrap().to_string();

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": id, "issue_text": "New text"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": "successfully updated", "_id": id}));

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/issues/apitest?_id={id}"),
        None,
    )
    .await;
    let issue = &body.as_array().unwrap()[0];
    assert_eq!(issue["issue_text"], "New text");
    assert_eq!(issue["created_on"], created["created_on"]);

    let before = chrono_parse(created["updated_on"].as_str().unwrap());
    let after = chrono_parse(issue["updated_on"].as_str().unwrap());
    assert!(after > before);
}

#[tokio::test]
async fn update_multiple_fields_on_an_issue() {
    let app = test_app().await;
    let created = create_issue(
        &app,
        "apitest",
        json!({"issue_title": "Title", "issue_text": "Text", "created_by": "Tester"}),
    )
    .await;
    let id = created["_id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({
            "_id": id,
            "issue_title": "New title",
            "assigned_to": "Somebody",
            "open": false
        })),
    )
    .await;
    assert_eq!(body, json!({"result": "successfully updated", "_id": id}));

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/issues/apitest?_id={id}"),
        None,
    )
    .await;
    let issue = &body.as_array().unwrap()[0];
    assert_eq!(issue["issue_title"], "New title");
    assert_eq!(issue["assigned_to"], "Somebody");
    assert_eq!(issue["open"], false);
}

#[tokio::test]
async fn update_an_issue_with_missing_id() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"issue_text": "New text"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "missing _id"}));
}

#[tokio::test]
async fn update_an_issue_with_no_fields_to_update() {
    let app = test_app().await;
    let created = create_issue(
        &app,
        "apitest",
        json!({"issue_title": "Title", "issue_text": "Text", "created_by": "Tester"}),
    )
    .await;
    let id = created["_id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": id})),
    )
    .await;
    assert_eq!(body, json!({"error": "no update field(s) sent", "_id": id}));

    // The record is untouched.
    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/issues/apitest?_id={id}"),
        None,
    )
    .await;
    let issue = &body.as_array().unwrap()[0];
    assert_eq!(issue["updated_on"], created["updated_on"]);
}

#[tokio::test]
async fn update_an_issue_with_an_invalid_id() {
    let app = test_app().await;

    let (_, body) = send(
        &app,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": "invalid_id", "issue_text": "New text"})),
    )
    .await;
    assert_eq!(body, json!({"error": "could not update", "_id": "invalid_id"}));

    // A well-formed but unknown id reports the same way.
    let unknown = "00000000-0000-4000-8000-000000000000";
    let (_, body) = send(
        &app,
        Method::PUT,
        "/api/issues/apitest",
        Some(json!({"_id": unknown, "issue_text": "New text"})),
    )
    .await;
    assert_eq!(body, json!({"error": "could not update", "_id": unknown}));
}

#[tokio::test]
async fn delete_an_issue() {
    let app = test_app().await;
    let created = create_issue(
        &app,
        "apitest",
        json!({"issue_title": "Title", "issue_text": "Text", "created_by": "Tester"}),
    )
    .await;
    let id = created["_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/issues/apitest",
        Some(json!({"_id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": "successfully deleted", "_id": id}));

    // Deleting again reports failure: the record is gone for good.
    let (_, body) = send(
        &app,
        Method::DELETE,
        "/api/issues/apitest",
        Some(json!({"_id": id})),
    )
    .await;
    assert_eq!(body, json!({"error": "could not delete", "_id": id}));
}

#[tokio::test]
async fn delete_an_issue_with_an_invalid_id() {
    let app = test_app().await;

    let (_, body) = send(
        &app,
        Method::DELETE,
        "/api/issues/apitest",
        Some(json!({"_id": "invalid_id"})),
    )
    .await;
    assert_eq!(body, json!({"error": "could not delete", "_id": "invalid_id"}));
}

#[tokio::test]
async fn delete_an_issue_with_missing_id() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::DELETE, "/api/issues/apitest", Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "missing _id"}));
}

#[tokio::test]
async fn health_check_responds() {
    let app = test_app().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

fn chrono_parse(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .unwrap()
        .with_timezone(&chrono::Utc)
}
