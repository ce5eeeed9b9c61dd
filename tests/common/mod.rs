#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use reviewer_assignment::{
    routes, services::reviewer_selector::ReviewerSelector, store::MemoryStore, AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

pub fn app() -> Router {
    routes::router(AppState::from_store(
        Arc::new(MemoryStore::new()),
        ReviewerSelector::default(),
    ))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}

pub async fn post(app: &Router, uri: &str, body: JsonValue) -> (StatusCode, JsonValue) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, JsonValue) {
    send(app, Method::GET, uri, None).await
}

/// Creates a team whose members are all active.
pub async fn add_team(app: &Router, team: &str, members: &[&str]) {
    let members: Vec<JsonValue> = members
        .iter()
        .map(|id| json!({ "user_id": id, "username": format!("User {}", id), "is_active": true }))
        .collect();
    let (status, body) = post(app, "/team/add", json!({ "team_name": team, "members": members })).await;
    assert_eq!(status, StatusCode::CREATED, "team add failed: {}", body);
}

pub async fn create_pr(app: &Router, id: &str, author: &str) -> JsonValue {
    let (status, body) = post(
        app,
        "/pullRequest/create",
        json!({ "pull_request_id": id, "pull_request_name": format!("PR {}", id), "author_id": author }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "pr create failed: {}", body);
    body
}

pub fn reviewers(pr: &JsonValue) -> Vec<String> {
    pr["pr"]["assigned_reviewers"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
