//! Shared helpers for the HTTP integration tests.
//!
//! The app is built with [`build_app_router`] over an in-memory store, so
//! these tests exercise the production middleware stack without a database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use managix_api::auth::jwt::{generate_access_token, JwtConfig};
use managix_api::config::ServerConfig;
use managix_api::router::build_app_router;
use managix_api::state::AppState;
use managix_core::roles::{Role, User};
use managix_core::store::InMemoryProjectStore;
use tower::ServiceExt;

pub const MANAGER_ID: i64 = 1;
pub const EMPLOYEE_ID: i64 = 2;
pub const QA_ID: i64 = 3;

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router over a fresh in-memory store.
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState::new(Arc::new(InMemoryProjectStore::new()), config.clone());
    build_app_router(state, &config).unwrap()
}

pub fn manager() -> User {
    User::new(MANAGER_ID, "Maya", "maya@example.com", Role::Manager)
}

pub fn employee() -> User {
    User::new(EMPLOYEE_ID, "Eli", "eli@example.com", Role::Employee)
}

pub fn qa() -> User {
    User::new(QA_ID, "Quinn", "quinn@example.com", Role::Qa)
}

pub fn token_for(user: &User) -> String {
    generate_access_token(user, &test_config().jwt).unwrap()
}

/// Send one request through a clone of `app`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&User>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("authorization", format!("Bearer {}", token_for(user)));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, user: &User) -> Response<Body> {
    send(app, Method::GET, uri, Some(user), None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    user: &User,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(user), Some(body)).await
}

pub async fn post_empty(app: &Router, uri: &str, user: &User) -> Response<Body> {
    send(app, Method::POST, uri, Some(user), None).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    user: &User,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(user), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a project as the manager and return its id.
pub async fn create_project(app: &Router, title: &str) -> i64 {
    let deadline = chrono::Utc::now() + chrono::Duration::days(30);
    let response = post_json(
        app,
        "/api/v1/projects",
        &manager(),
        serde_json::json!({
            "title": title,
            "deadline": deadline,
            "budget_cents": 100_000,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Add a task as the manager and return the id it was given.
pub async fn add_task(app: &Router, project_id: i64, assignee_id: Option<i64>) -> i64 {
    let response = post_json(
        app,
        &format!("/api/v1/projects/{project_id}/tasks"),
        &manager(),
        serde_json::json!({ "title": "Task", "assignee_id": assignee_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_i64())
        .max()
        .unwrap()
}
