//! HTTP tests for the FamilyHub API
//!
//! Tests that need PostgreSQL are ignored by default; run them with
//! `cargo test -- --ignored` and DATABASE_URL set.

mod common;

use axum::http::{Method, StatusCode};
use common::{send, unique, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_root_is_public() {
    let app = TestContext::offline();

    let (status, body) = send(&app, Method::GET, "/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to FamilyHubApp API! It's running!");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let app = TestContext::offline();

    let (status, body) = send(&app, Method::GET, "/api/v1/families/", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Missing X-User-Id header");
}

#[tokio::test]
async fn test_unknown_api_path_is_not_found_without_user_header() {
    let app = TestContext::offline();

    let (status, _) = send(&app, Method::GET, "/api/v1/does-not-exist", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_user_header_is_unauthorized() {
    let app = TestContext::offline();

    let request = axum::http::Request::builder()
        .uri("/api/v1/users/me")
        .header("x-user-id", "not-a-number")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_unknown_user_is_unauthorized() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .send(Method::GET, "/api/v1/users/me", Some(i64::MAX), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_health_reports_connected_database() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_current_user() {
    let ctx = TestContext::new().await;
    let alice = ctx.create_user("Alice").await;

    let (status, body) = ctx
        .send(Method::GET, "/api/v1/users/me", Some(alice), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], alice);
    assert_eq!(body["data"]["name"], "Alice");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_family_label_task_flow() {
    let ctx = TestContext::new().await;
    let alice = ctx.create_user("Alice").await;
    let family_name = unique("Smith Family");

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/families/",
            Some(alice),
            Some(json!({ "family_name": family_name })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["message"],
        format!("Family '{}' created successfully.", family_name)
    );
    let family_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            &format!("/api/v1/families/{}/labels/", family_id),
            Some(alice),
            Some(json!({ "name": "Chores", "color": "#FFDDC1" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let label_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            &format!("/api/v1/families/{}/tasks/", family_id),
            Some(alice),
            Some(json!({
                "title": "Take out trash",
                "assignee_id": alice,
                "label_ids": [label_id]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Task created successfully.");
    assert_eq!(body["data"]["task_type"], "single");
    assert_eq!(body["data"]["assignee"]["id"], alice);
    assert_eq!(body["data"]["labels"][0]["name"], "Chores");
    assert_eq!(body["data"]["label_ids"], json!([label_id]));
    let task_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = ctx
        .send(
            Method::PUT,
            &format!("/api/v1/families/{}/tasks/{}", family_id, task_id),
            Some(alice),
            Some(json!({ "is_done": true, "assignee_id": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_done"], true);
    assert!(body["data"]["assignee"].is_null());
    assert_eq!(body["data"]["title"], "Take out trash");

    let (status, body) = ctx
        .send(
            Method::DELETE,
            &format!("/api/v1/families/{}/labels/{}", family_id, label_id),
            Some(alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Label deleted successfully.");

    let (status, body) = ctx
        .send(
            Method::GET,
            &format!("/api/v1/families/{}/tasks/{}", family_id, task_id),
            Some(alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["labels"], json!([]));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_non_member_is_forbidden() {
    let ctx = TestContext::new().await;
    let alice = ctx.create_user("Alice").await;
    let bob = ctx.create_user("Bob").await;

    let (_, body) = ctx
        .send(
            Method::POST,
            "/api/v1/families/",
            Some(alice),
            Some(json!({ "family_name": unique("Private Family") })),
        )
        .await;
    let family_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = ctx
        .send(
            Method::GET,
            &format!("/api/v1/families/{}", family_id),
            Some(bob),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["detail"].is_string());
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_unknown_family_is_not_found() {
    let ctx = TestContext::new().await;
    let alice = ctx.create_user("Alice").await;

    let (status, body) = ctx
        .send(
            Method::GET,
            &format!("/api/v1/families/{}/labels/", i64::MAX),
            Some(alice),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Family not found.");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_duplicate_label_is_conflict() {
    let ctx = TestContext::new().await;
    let alice = ctx.create_user("Alice").await;

    let (_, body) = ctx
        .send(
            Method::POST,
            "/api/v1/families/",
            Some(alice),
            Some(json!({ "family_name": unique("Label Family") })),
        )
        .await;
    let family_id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/families/{}/labels/", family_id);

    let (status, _) = ctx
        .send(Method::POST, &uri, Some(alice), Some(json!({ "name": "Groceries" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .send(Method::POST, &uri, Some(alice), Some(json!({ "name": "Groceries" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["detail"],
        "Label name 'Groceries' already exists in this family."
    );
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_validation_errors_are_unprocessable() {
    let ctx = TestContext::new().await;
    let alice = ctx.create_user("Alice").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/families/",
            Some(alice),
            Some(json!({ "family_name": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "family_name");

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/families/",
            Some(alice),
            Some(json!({ "wrong": "shape" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "body");

    let (status, body) = ctx
        .send(Method::GET, "/api/v1/families/?limit=0", Some(alice), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "limit");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn test_non_admin_cannot_add_members() {
    let ctx = TestContext::new().await;
    let alice = ctx.create_user("Alice").await;
    let bob = ctx.create_user("Bob").await;
    let carol = ctx.create_user("Carol").await;

    let (_, body) = ctx
        .send(
            Method::POST,
            "/api/v1/families/",
            Some(alice),
            Some(json!({ "family_name": unique("Member Family") })),
        )
        .await;
    let family_id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/families/{}/members/", family_id);

    let (status, body) = ctx
        .send(Method::POST, &uri, Some(alice), Some(json!({ "user_id": bob })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "member");

    let (status, _) = ctx
        .send(Method::POST, &uri, Some(bob), Some(json!({ "user_id": carol })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(Method::POST, &uri, Some(alice), Some(json!({ "user_id": bob })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = ctx.send(Method::GET, &uri, Some(bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(|m| m.len()), Some(2));
}
