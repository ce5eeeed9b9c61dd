use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::pull_request_dto::{
        CreatePrRequest, MergePrRequest, PrQuery, PrResponse, ReassignRequest,
        ReassignResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/pullRequest/create",
    request_body = CreatePrRequest,
    responses(
        (status = 201, description = "PR created with reviewers assigned", body = PrResponse),
        (status = 404, description = "Author not found"),
        (status = 409, description = "PR already exists")
    )
)]
#[axum::debug_handler]
pub async fn create_pr(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreatePrRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let pr = state
        .pull_request_service
        .create(
            &payload.pull_request_id,
            &payload.pull_request_name,
            &payload.author_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(PrResponse::from(pr))))
}

#[utoipa::path(
    post,
    path = "/pullRequest/merge",
    request_body = MergePrRequest,
    responses(
        (status = 200, description = "PR merged (idempotent)", body = PrResponse),
        (status = 404, description = "PR not found")
    )
)]
#[axum::debug_handler]
pub async fn merge_pr(
    State(state): State<AppState>,
    payload: std::result::Result<Json<MergePrRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let pr = state
        .pull_request_service
        .merge(&payload.pull_request_id)
        .await?;
    Ok(Json(PrResponse::from(pr)))
}

#[utoipa::path(
    post,
    path = "/pullRequest/reassign",
    request_body = ReassignRequest,
    responses(
        (status = 200, description = "Reviewer replaced", body = ReassignResponse),
        (status = 404, description = "PR or user not found"),
        (status = 409, description = "PR merged, reviewer not assigned, or no candidate")
    )
)]
#[axum::debug_handler]
pub async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let outcome = state
        .pull_request_service
        .reassign(&payload.pull_request_id, &payload.old_reviewer_id)
        .await?;
    Ok(Json(ReassignResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/pullRequest/get",
    params(
        ("pull_request_id" = String, Query, description = "Pull request id")
    ),
    responses(
        (status = 200, description = "PR with its reviewers", body = PrResponse),
        (status = 404, description = "PR not found")
    )
)]
#[axum::debug_handler]
pub async fn get_pr(
    State(state): State<AppState>,
    Query(query): Query<PrQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let pr = state
        .pull_request_service
        .get_by_id(&query.pull_request_id)
        .await?;
    Ok(Json(PrResponse::from(pr)))
}
