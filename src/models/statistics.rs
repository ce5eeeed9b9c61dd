use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub pull_requests: PullRequestStats,
    pub users: UserStats,
    pub teams: TeamStats,
    pub top_reviewers: Vec<ReviewerStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestStats {
    pub total: i64,
    pub open: i64,
    pub merged: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewerStat {
    pub user_id: String,
    pub username: String,
    pub review_count: i64,
}

/// Number of reviewers reported in `Statistics::top_reviewers`.
pub const TOP_REVIEWERS_LIMIT: usize = 10;
