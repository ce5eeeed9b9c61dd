use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::utils::time::now;

/// Upper bound on reviewer slots per pull request.
pub const MAX_REVIEWERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(Error::Internal(format!("unknown PR status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
    /// Reviewer ids in slot order; at most `MAX_REVIEWERS`, never the author.
    pub assigned_reviewers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn new(
        pull_request_id: impl Into<String>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        let ts = now();
        Self {
            pull_request_id: pull_request_id.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            assigned_reviewers: Vec::with_capacity(MAX_REVIEWERS),
            created_at: ts,
            updated_at: ts,
            merged_at: None,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged
    }

    pub fn is_open(&self) -> bool {
        self.status == PrStatus::Open
    }

    /// Drops the author, duplicates, and anything past `MAX_REVIEWERS`.
    pub fn assign_reviewers(&mut self, reviewer_ids: Vec<String>) {
        let mut assigned: Vec<String> = Vec::with_capacity(MAX_REVIEWERS);
        for id in reviewer_ids {
            if assigned.len() == MAX_REVIEWERS {
                break;
            }
            if id != self.author_id && !assigned.contains(&id) {
                assigned.push(id);
            }
        }
        self.assigned_reviewers = assigned;
        self.updated_at = now();
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }

    /// Stamps the merge once; a merged PR is returned untouched.
    pub fn merge(&mut self) -> bool {
        if self.is_merged() {
            return false;
        }
        let ts = now();
        self.status = PrStatus::Merged;
        self.merged_at = Some(ts);
        self.updated_at = ts;
        true
    }

    /// Swaps `old` for `new` in place, keeping its slot position.
    pub fn replace_reviewer(&mut self, old: &str, new: &str) -> bool {
        match self.assigned_reviewers.iter_mut().find(|r| r.as_str() == old) {
            Some(slot) => {
                *slot = new.to_string();
                self.updated_at = now();
                true
            }
            None => false,
        }
    }
}
