use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::bulk_deactivation::{BulkDeactivationResult, ReassignedPr, SkippedPr};
use crate::models::team::Team;
use crate::models::user::User;
use crate::services::team_service::NewMember;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TeamMemberDto {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub username: String,
    pub is_active: bool,
}

impl From<User> for TeamMemberDto {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            is_active: user.is_active,
        }
    }
}

impl From<TeamMemberDto> for NewMember {
    fn from(dto: TeamMemberDto) -> Self {
        Self {
            user_id: dto.user_id,
            username: dto.username,
            is_active: dto.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1))]
    pub team_name: String,
    #[serde(default)]
    #[validate(nested)]
    pub members: Vec<TeamMemberDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamDto {
    pub team_name: String,
    pub members: Vec<TeamMemberDto>,
}

impl From<Team> for TeamDto {
    fn from(team: Team) -> Self {
        Self {
            team_name: team.team_name,
            members: team.members.into_iter().map(TeamMemberDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub team: TeamDto,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TeamQuery {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub team_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkDeactivateRequest {
    #[validate(length(min = 1))]
    pub team_name: String,
    /// Omitted or empty deactivates the whole team.
    #[serde(default)]
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReassignedPrDto {
    pub pull_request_id: String,
    pub old_reviewer_id: String,
    pub new_reviewer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SkippedPrDto {
    pub pull_request_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDeactivateResponse {
    pub deactivated_users: Vec<String>,
    pub reassigned_prs: Vec<ReassignedPrDto>,
    pub skipped_prs: Vec<SkippedPrDto>,
}

impl From<ReassignedPr> for ReassignedPrDto {
    fn from(pr: ReassignedPr) -> Self {
        Self {
            pull_request_id: pr.pull_request_id,
            old_reviewer_id: pr.old_reviewer_id,
            new_reviewer_id: pr.new_reviewer_id,
        }
    }
}

impl From<SkippedPr> for SkippedPrDto {
    fn from(pr: SkippedPr) -> Self {
        Self {
            pull_request_id: pr.pull_request_id,
            reason: pr.reason,
        }
    }
}

impl From<BulkDeactivationResult> for BulkDeactivateResponse {
    fn from(result: BulkDeactivationResult) -> Self {
        Self {
            deactivated_users: result.deactivated_users,
            reassigned_prs: result.reassigned_prs.into_iter().map(Into::into).collect(),
            skipped_prs: result.skipped_prs.into_iter().map(Into::into).collect(),
        }
    }
}
