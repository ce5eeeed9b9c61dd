use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::team_dto::{
        BulkDeactivateRequest, BulkDeactivateResponse, CreateTeamRequest, TeamDto, TeamQuery,
        TeamResponse,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/team/add",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamResponse),
        (status = 400, description = "Invalid payload or team already exists")
    )
)]
#[axum::debug_handler]
pub async fn create_team(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let members = payload.members.into_iter().map(Into::into).collect();
    let team = state
        .team_service
        .create_team(&payload.team_name, members)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TeamResponse {
            team: TeamDto::from(team),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/team/get",
    params(
        ("team_name" = String, Query, description = "Team name")
    ),
    responses(
        (status = 200, description = "Team with members", body = TeamDto),
        (status = 404, description = "Team not found")
    )
)]
#[axum::debug_handler]
pub async fn get_team(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    let team = state.team_service.get_team(&query.team_name).await?;
    Ok(Json(TeamDto::from(team)))
}

#[utoipa::path(
    post,
    path = "/team/deactivateUsers",
    request_body = BulkDeactivateRequest,
    responses(
        (status = 200, description = "Users deactivated, open PRs repaired where possible", body = BulkDeactivateResponse),
        (status = 400, description = "A user is not a member of the team"),
        (status = 404, description = "Team not found")
    )
)]
#[axum::debug_handler]
pub async fn deactivate_users(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BulkDeactivateRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    payload.validate()?;
    let result = state
        .bulk_deactivation_service
        .deactivate_users_and_reassign(&payload.team_name, &payload.user_ids)
        .await?;
    Ok(Json(BulkDeactivateResponse::from(result)))
}
