pub mod docs;
pub mod health;
pub mod pull_request;
pub mod stats;
pub mod team;
pub mod user;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::cors::permissive_cors;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/team/add", post(team::create_team))
        .route("/team/get", get(team::get_team))
        .route("/team/deactivateUsers", post(team::deactivate_users))
        .route("/users/setIsActive", post(user::set_is_active))
        .route("/users/getReview", get(user::get_review))
        .route("/pullRequest/create", post(pull_request::create_pr))
        .route("/pullRequest/merge", post(pull_request::merge_pr))
        .route("/pullRequest/reassign", post(pull_request::reassign_reviewer))
        .route("/pullRequest/get", get(pull_request::get_pr))
        .route("/stats", get(stats::get_statistics))
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .with_state(state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
}
