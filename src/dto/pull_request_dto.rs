use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::pull_request::PullRequest;
use crate::services::pull_request_service::Reassignment;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePrRequest {
    #[validate(length(min = 1))]
    pub pull_request_id: String,
    #[validate(length(min = 1))]
    pub pull_request_name: String,
    #[validate(length(min = 1))]
    pub author_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MergePrRequest {
    #[validate(length(min = 1))]
    pub pull_request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReassignRequest {
    #[validate(length(min = 1))]
    pub pull_request_id: String,
    #[validate(length(min = 1))]
    pub old_reviewer_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PrQuery {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub pull_request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PullRequestDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    #[schema(example = "OPEN")]
    pub status: String,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequest> for PullRequestDto {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.pull_request_id,
            pull_request_name: pr.pull_request_name,
            author_id: pr.author_id,
            status: pr.status.to_string(),
            assigned_reviewers: pr.assigned_reviewers,
            created_at: Some(pr.created_at),
            merged_at: pr.merged_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrResponse {
    pub pr: PullRequestDto,
}

impl From<PullRequest> for PrResponse {
    fn from(pr: PullRequest) -> Self {
        Self { pr: pr.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReassignResponse {
    pub pr: PullRequestDto,
    pub replaced_by: String,
}

impl From<Reassignment> for ReassignResponse {
    fn from(outcome: Reassignment) -> Self {
        Self {
            pr: outcome.pr.into(),
            replaced_by: outcome.replaced_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PullRequestShortDto {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
}

impl From<PullRequest> for PullRequestShortDto {
    fn from(pr: PullRequest) -> Self {
        Self {
            pull_request_id: pr.pull_request_id,
            pull_request_name: pr.pull_request_name,
            author_id: pr.author_id,
            status: pr.status.to_string(),
        }
    }
}
