//! Persistence capabilities the reviewer-assignment core depends on.
//!
//! Each entity gets a narrow async trait. The bulk orchestrator additionally
//! needs a snapshot of open reviewer slots, which is its own capability
//! (`ReviewerSnapshotStore`) rather than a method reached by naming a
//! concrete backend. `Store` bundles everything a backend must provide.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::bulk_deactivation::ReviewerSlot;
use crate::models::pull_request::PullRequest;
use crate::models::statistics::Statistics;
use crate::models::team::Team;
use crate::models::user::User;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `NotFound` when the user does not exist.
    async fn get_user(&self, user_id: &str) -> Result<User>;

    /// All members of a team, active or not, in creation order.
    async fn get_users_by_team(&self, team_name: &str) -> Result<Vec<User>>;

    /// Users matching any of `user_ids`; unknown ids are silently absent.
    async fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>>;

    /// Active members of `team_name` other than `exclude_user_id`, in creation order.
    async fn active_team_members_excluding(
        &self,
        team_name: &str,
        exclude_user_id: &str,
    ) -> Result<Vec<User>>;

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User>;

    /// Deactivates every user in one atomic write; nothing changes on failure.
    async fn bulk_deactivate(&self, user_ids: &[String]) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Creates the team and upserts its members atomically.
    /// Fails with `TeamExists` if the name is taken.
    async fn create_team(&self, team: &Team) -> Result<()>;

    async fn get_team(&self, team_name: &str) -> Result<Team>;

    async fn team_exists(&self, team_name: &str) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Inserts the PR with its reviewer slots atomically.
    /// Fails with `PrExists` if the id is taken, even under a concurrent create.
    async fn create_pr(&self, pr: &PullRequest) -> Result<()>;

    async fn get_pr(&self, pr_id: &str) -> Result<PullRequest>;

    /// Overwrites name, status and timestamps. An already stamped
    /// `merged_at` is never replaced.
    async fn update_pr(&self, pr: &PullRequest) -> Result<()>;

    /// Swaps exactly one reviewer slot, conditioned on `old_reviewer_id`
    /// holding it at write time. Losers of a race observe `NotAssigned`.
    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<()>;

    /// PRs on which the user holds a reviewer slot, newest first.
    async fn prs_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequest>>;

    async fn pr_exists(&self, pr_id: &str) -> Result<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewerSnapshotStore: Send + Sync {
    /// Every reviewer slot on an OPEN PR held by one of `reviewer_ids`,
    /// ordered by PR creation then slot.
    async fn open_prs_with_reviewers(&self, reviewer_ids: &[String]) -> Result<Vec<ReviewerSlot>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn statistics(&self) -> Result<Statistics>;
}

pub trait Store:
    UserStore + TeamStore + PullRequestStore + ReviewerSnapshotStore + StatsStore
{
}

impl<T> Store for T where
    T: UserStore + TeamStore + PullRequestStore + ReviewerSnapshotStore + StatsStore
{
}
