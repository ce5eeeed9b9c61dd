mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{add_team, app, create_pr, get, post};

#[tokio::test]
async fn team_add_and_get() {
    let app = app();
    let (status, body) = post(
        &app,
        "/team/add",
        json!({
            "team_name": "backend",
            "members": [
                { "user_id": "u1", "username": "Alice", "is_active": true },
                { "user_id": "u2", "username": "Bob", "is_active": false }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["team"]["team_name"], "backend");
    assert_eq!(body["team"]["members"][1]["is_active"], false);

    let (status, team) = get(&app, "/team/get?team_name=backend").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team["members"][0]["user_id"], "u1");
    assert_eq!(team["members"][0]["username"], "Alice");

    let (status, body) = post(&app, "/team/add", json!({ "team_name": "backend", "members": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TEAM_EXISTS");
}

#[tokio::test]
async fn missing_team_and_query() {
    let app = app();
    let (status, body) = get(&app, "/team/get?team_name=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = get(&app, "/team/get").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn inactive_users_are_never_assigned() {
    let app = app();
    add_team(&app, "backend", &["u1", "u2", "u3"]).await;

    let (status, body) = post(&app, "/users/setIsActive", json!({ "user_id": "u2", "is_active": false })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_active"], false);
    assert_eq!(body["user"]["team_name"], "backend");

    for i in 0..10 {
        let pr = create_pr(&app, &format!("pr-{}", i), "u1").await;
        assert_eq!(pr["pr"]["assigned_reviewers"], json!(["u3"]));
    }

    let (status, review) = get(&app, "/users/getReview?user_id=u2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["user_id"], "u2");
    assert_eq!(review["pull_requests"], json!([]));

    let (status, _) = post(&app, "/users/setIsActive", json!({ "user_id": "ghost", "is_active": true })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_reflect_activity() {
    let app = app();
    add_team(&app, "backend", &["u1", "u2"]).await;
    create_pr(&app, "pr-1", "u1").await;
    create_pr(&app, "pr-2", "u1").await;
    post(&app, "/pullRequest/merge", json!({ "pull_request_id": "pr-2" })).await;

    let (status, stats) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["pull_requests"], json!({ "total": 2, "open": 1, "merged": 1 }));
    assert_eq!(stats["users"], json!({ "total": 2, "active": 2, "inactive": 0 }));
    assert_eq!(stats["teams"]["total"], 1);
    assert_eq!(stats["top_reviewers"][0]["user_id"], "u2");
    assert_eq!(stats["top_reviewers"][0]["review_count"], 2);
}

#[tokio::test]
async fn health_and_openapi() {
    let app = app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = get(&app, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/pullRequest/reassign"].is_object());
    assert!(doc["paths"]["/pullRequest/get"].is_object());
}
