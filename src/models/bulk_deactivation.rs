use serde::{Deserialize, Serialize};

/// One row of the pre-deactivation snapshot: a reviewer slot on an open PR
/// that is about to go stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewerSlot {
    pub pull_request_id: String,
    pub reviewer_id: String,
    pub reviewer_team: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignedPr {
    pub pull_request_id: String,
    pub old_reviewer_id: String,
    pub new_reviewer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPr {
    pub pull_request_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeactivationResult {
    pub deactivated_users: Vec<String>,
    pub reassigned_prs: Vec<ReassignedPr>,
    pub skipped_prs: Vec<SkippedPr>,
}
