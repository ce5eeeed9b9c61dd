use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::statistics::{ReviewerStat, Statistics};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PullRequestCounts {
    pub total: i64,
    pub open: i64,
    pub merged: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCounts {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamCounts {
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewerStatDto {
    pub user_id: String,
    pub username: String,
    pub review_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatisticsResponse {
    pub pull_requests: PullRequestCounts,
    pub users: UserCounts,
    pub teams: TeamCounts,
    pub top_reviewers: Vec<ReviewerStatDto>,
}

impl From<ReviewerStat> for ReviewerStatDto {
    fn from(stat: ReviewerStat) -> Self {
        Self {
            user_id: stat.user_id,
            username: stat.username,
            review_count: stat.review_count,
        }
    }
}

impl From<Statistics> for StatisticsResponse {
    fn from(stats: Statistics) -> Self {
        Self {
            pull_requests: PullRequestCounts {
                total: stats.pull_requests.total,
                open: stats.pull_requests.open,
                merged: stats.pull_requests.merged,
            },
            users: UserCounts {
                total: stats.users.total,
                active: stats.users.active,
                inactive: stats.users.inactive,
            },
            teams: TeamCounts {
                total: stats.teams.total,
            },
            top_reviewers: stats.top_reviewers.into_iter().map(Into::into).collect(),
        }
    }
}
