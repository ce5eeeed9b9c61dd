use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::pull_request::{PullRequest, MAX_REVIEWERS};
use crate::models::user::User;
use crate::services::reviewer_selector::ReviewerSelector;
use crate::store::{PullRequestStore, UserStore};

/// Outcome of a single reviewer reassignment.
#[derive(Debug, Clone)]
pub struct Reassignment {
    pub pr: PullRequest,
    pub replaced_by: String,
}

/// Owns the OPEN -> MERGED lifecycle of a pull request and its reviewer slots.
#[derive(Clone)]
pub struct PullRequestService {
    prs: Arc<dyn PullRequestStore>,
    users: Arc<dyn UserStore>,
    selector: ReviewerSelector,
}

impl PullRequestService {
    pub fn new(
        prs: Arc<dyn PullRequestStore>,
        users: Arc<dyn UserStore>,
        selector: ReviewerSelector,
    ) -> Self {
        Self {
            prs,
            users,
            selector,
        }
    }

    /// Creates an OPEN PR with up to two reviewers from the author's team.
    /// An empty candidate pool is fine: the PR is created without reviewers.
    pub async fn create(&self, pr_id: &str, pr_name: &str, author_id: &str) -> Result<PullRequest> {
        if self.prs.pr_exists(pr_id).await? {
            return Err(Error::PrExists(pr_id.to_string()));
        }

        let author = self.users.get_user(author_id).await?;
        let candidates = match author.team_name.as_deref() {
            Some(team) => {
                self.users
                    .active_team_members_excluding(team, author_id)
                    .await?
            }
            None => Vec::new(),
        };
        debug!(pr_id, pool = candidates.len(), "reviewer candidates for new PR");

        let mut pr = PullRequest::new(pr_id, pr_name, author_id);
        pr.assign_reviewers(self.selector.select_reviewers(&candidates, MAX_REVIEWERS));

        self.prs.create_pr(&pr).await?;
        info!(pr_id, author_id, reviewers = ?pr.assigned_reviewers, "pull request created");
        Ok(pr)
    }

    /// Idempotent: merging a merged PR returns it unchanged without writing.
    pub async fn merge(&self, pr_id: &str) -> Result<PullRequest> {
        let mut pr = self.prs.get_pr(pr_id).await?;
        if !pr.merge() {
            return Ok(pr);
        }

        self.prs.update_pr(&pr).await?;
        info!(pr_id, "pull request merged");
        self.prs.get_pr(pr_id).await
    }

    /// Replaces `old_reviewer_id` with a random active member of their team.
    ///
    /// The base pool is the old reviewer's active teammates minus the old
    /// reviewer. [`eligible_for`] then drops the author and the co-reviewer,
    /// so the effective pool is the same one bulk repair draws from.
    pub async fn reassign(&self, pr_id: &str, old_reviewer_id: &str) -> Result<Reassignment> {
        let pr = self.prs.get_pr(pr_id).await?;
        if pr.is_merged() {
            return Err(Error::PrMerged(pr_id.to_string()));
        }
        if !pr.has_reviewer(old_reviewer_id) {
            return Err(Error::NotAssigned {
                user_id: old_reviewer_id.to_string(),
                pr_id: pr_id.to_string(),
            });
        }

        let old_reviewer = self.users.get_user(old_reviewer_id).await?;
        let team_name = old_reviewer.team_name.unwrap_or_default();
        let pool = if team_name.is_empty() {
            Vec::new()
        } else {
            self.users
                .active_team_members_excluding(&team_name, old_reviewer_id)
                .await?
        };
        let candidates = eligible_for(&pr, pool);
        debug!(pr_id, pool = candidates.len(), "replacement candidates");

        let new_reviewer_id = self
            .selector
            .select_random_reviewer(&candidates)
            .ok_or_else(|| Error::NoCandidate(team_name.clone()))?;

        self.prs
            .replace_reviewer(pr_id, old_reviewer_id, &new_reviewer_id)
            .await?;
        info!(
            pr_id,
            old_reviewer_id,
            new_reviewer_id = %new_reviewer_id,
            "reviewer reassigned"
        );

        let pr = self.prs.get_pr(pr_id).await?;
        Ok(Reassignment {
            pr,
            replaced_by: new_reviewer_id,
        })
    }

    pub async fn get_by_id(&self, pr_id: &str) -> Result<PullRequest> {
        self.prs.get_pr(pr_id).await
    }

    pub async fn get_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequest>> {
        self.prs.prs_by_reviewer(user_id).await
    }
}

/// Drops candidates who would break the PR's reviewer invariants:
/// the author and anyone already holding a slot.
pub(crate) fn eligible_for(pr: &PullRequest, candidates: Vec<User>) -> Vec<User> {
    candidates
        .into_iter()
        .filter(|c| c.user_id != pr.author_id && !pr.has_reviewer(&c.user_id))
        .collect()
}
