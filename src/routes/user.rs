use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::pull_request_dto::PullRequestShortDto,
    dto::user_dto::{ReviewListResponse, SetIsActiveRequest, UserDto, UserQuery, UserResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/users/setIsActive",
    request_body = SetIsActiveRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn set_is_active(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let user = state
        .user_service
        .set_is_active(&payload.user_id, payload.is_active)
        .await?;
    Ok(Json(UserResponse {
        user: UserDto::from(user),
    }))
}

#[utoipa::path(
    get,
    path = "/users/getReview",
    params(
        ("user_id" = String, Query, description = "Reviewer id")
    ),
    responses(
        (status = 200, description = "PRs where the user is a reviewer", body = ReviewListResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_review(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let prs = state
        .pull_request_service
        .get_by_reviewer(&query.user_id)
        .await?;
    Ok(Json(ReviewListResponse {
        user_id: query.user_id,
        pull_requests: prs.into_iter().map(PullRequestShortDto::from).collect(),
    }))
}
