use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::{pull_request_dto, stats_dto, team_dto, user_dto};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::team::create_team,
        super::team::get_team,
        super::team::deactivate_users,
        super::user::set_is_active,
        super::user::get_review,
        super::pull_request::create_pr,
        super::pull_request::merge_pr,
        super::pull_request::reassign_reviewer,
        super::pull_request::get_pr,
        super::stats::get_statistics,
        super::health::health,
    ),
    components(schemas(
        team_dto::TeamMemberDto,
        team_dto::CreateTeamRequest,
        team_dto::TeamDto,
        team_dto::TeamResponse,
        team_dto::BulkDeactivateRequest,
        team_dto::BulkDeactivateResponse,
        team_dto::ReassignedPrDto,
        team_dto::SkippedPrDto,
        user_dto::SetIsActiveRequest,
        user_dto::UserDto,
        user_dto::UserResponse,
        user_dto::ReviewListResponse,
        pull_request_dto::CreatePrRequest,
        pull_request_dto::MergePrRequest,
        pull_request_dto::ReassignRequest,
        pull_request_dto::PullRequestDto,
        pull_request_dto::PullRequestShortDto,
        pull_request_dto::PrResponse,
        pull_request_dto::ReassignResponse,
        stats_dto::StatisticsResponse,
        stats_dto::PullRequestCounts,
        stats_dto::UserCounts,
        stats_dto::TeamCounts,
        stats_dto::ReviewerStatDto,
    )),
    tags((name = "reviewer-assignment", description = "Pull request reviewer assignment"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
