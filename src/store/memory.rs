//! In-memory implementation of the store capabilities.
//!
//! All tables sit behind a single `RwLock`, so every write is atomic with
//! respect to every other operation. State is lost on restart.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{PullRequestStore, ReviewerSnapshotStore, StatsStore, TeamStore, UserStore};
use crate::error::{Error, Result};
use crate::models::bulk_deactivation::ReviewerSlot;
use crate::models::pull_request::{PrStatus, PullRequest};
use crate::models::statistics::{
    PullRequestStats, ReviewerStat, Statistics, TeamStats, UserStats, TOP_REVIEWERS_LIMIT,
};
use crate::models::team::Team;
use crate::models::user::User;
use crate::utils::time::now;

#[derive(Default)]
struct Tables {
    teams: HashMap<String, DateTime<Utc>>,
    /// Insertion order doubles as creation order.
    users: Vec<User>,
    /// Insertion order doubles as creation order.
    pull_requests: Vec<PullRequest>,
}

impl Tables {
    fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    fn pr(&self, pr_id: &str) -> Option<&PullRequest> {
        self.pull_requests.iter().find(|p| p.pull_request_id == pr_id)
    }

    fn pr_mut(&mut self, pr_id: &str) -> Option<&mut PullRequest> {
        self.pull_requests
            .iter_mut()
            .find(|p| p.pull_request_id == pr_id)
    }

    fn members(&self, team_name: &str) -> Vec<User> {
        self.users
            .iter()
            .filter(|u| u.belongs_to(team_name))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        let tables = self.tables.read().await;
        tables
            .user(user_id)
            .cloned()
            .ok_or_else(|| Error::user_not_found(user_id))
    }

    async fn get_users_by_team(&self, team_name: &str) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.members(team_name))
    }

    async fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.user_id))
            .cloned()
            .collect())
    }

    async fn active_team_members_excluding(
        &self,
        team_name: &str,
        exclude_user_id: &str,
    ) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members(team_name)
            .into_iter()
            .filter(|u| u.is_active && u.user_id != exclude_user_id)
            .collect())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| Error::user_not_found(user_id))?;
        user.is_active = is_active;
        user.updated_at = now();
        Ok(user.clone())
    }

    async fn bulk_deactivate(&self, user_ids: &[String]) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(missing) = user_ids.iter().find(|id| tables.user(id).is_none()) {
            return Err(Error::user_not_found(missing.as_str()));
        }
        let ts = now();
        for user in tables.users.iter_mut() {
            if user_ids.contains(&user.user_id) {
                user.is_active = false;
                user.updated_at = ts;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn create_team(&self, team: &Team) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.teams.contains_key(&team.team_name) {
            return Err(Error::TeamExists(team.team_name.clone()));
        }
        tables
            .teams
            .insert(team.team_name.clone(), team.created_at);

        for member in &team.members {
            match tables.users.iter().position(|u| u.user_id == member.user_id) {
                Some(idx) => {
                    let existing = &mut tables.users[idx];
                    existing.username = member.username.clone();
                    existing.team_name = member.team_name.clone();
                    existing.is_active = member.is_active;
                    existing.updated_at = member.updated_at;
                }
                None => tables.users.push(member.clone()),
            }
        }
        Ok(())
    }

    async fn get_team(&self, team_name: &str) -> Result<Team> {
        let tables = self.tables.read().await;
        let created_at = tables
            .teams
            .get(team_name)
            .copied()
            .ok_or_else(|| Error::team_not_found(team_name))?;
        Ok(Team {
            team_name: team_name.to_string(),
            members: tables.members(team_name),
            created_at,
        })
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool> {
        Ok(self.tables.read().await.teams.contains_key(team_name))
    }
}

#[async_trait]
impl PullRequestStore for MemoryStore {
    async fn create_pr(&self, pr: &PullRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.pr(&pr.pull_request_id).is_some() {
            return Err(Error::PrExists(pr.pull_request_id.clone()));
        }
        if tables.user(&pr.author_id).is_none() {
            return Err(Error::user_not_found(pr.author_id.as_str()));
        }
        tables.pull_requests.push(pr.clone());
        Ok(())
    }

    async fn get_pr(&self, pr_id: &str) -> Result<PullRequest> {
        let tables = self.tables.read().await;
        tables
            .pr(pr_id)
            .cloned()
            .ok_or_else(|| Error::pr_not_found(pr_id))
    }

    async fn update_pr(&self, pr: &PullRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .pr_mut(&pr.pull_request_id)
            .ok_or_else(|| Error::pr_not_found(pr.pull_request_id.as_str()))?;
        stored.pull_request_name = pr.pull_request_name.clone();
        stored.status = pr.status;
        stored.updated_at = pr.updated_at;
        stored.merged_at = stored.merged_at.or(pr.merged_at);
        Ok(())
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let pr = tables
            .pr_mut(pr_id)
            .ok_or_else(|| Error::pr_not_found(pr_id))?;
        if pr.is_merged() {
            return Err(Error::PrMerged(pr_id.to_string()));
        }
        if !pr.has_reviewer(old_reviewer_id) {
            return Err(Error::NotAssigned {
                user_id: old_reviewer_id.to_string(),
                pr_id: pr_id.to_string(),
            });
        }
        if pr.has_reviewer(new_reviewer_id) {
            return Err(Error::AlreadyAssigned {
                user_id: new_reviewer_id.to_string(),
                pr_id: pr_id.to_string(),
            });
        }
        pr.replace_reviewer(old_reviewer_id, new_reviewer_id);
        Ok(())
    }

    async fn prs_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .pull_requests
            .iter()
            .rev()
            .filter(|p| p.has_reviewer(user_id))
            .cloned()
            .collect())
    }

    async fn pr_exists(&self, pr_id: &str) -> Result<bool> {
        Ok(self.tables.read().await.pr(pr_id).is_some())
    }
}

#[async_trait]
impl ReviewerSnapshotStore for MemoryStore {
    async fn open_prs_with_reviewers(&self, reviewer_ids: &[String]) -> Result<Vec<ReviewerSlot>> {
        let tables = self.tables.read().await;
        let mut slots = Vec::new();
        for pr in tables.pull_requests.iter().filter(|p| p.is_open()) {
            for reviewer_id in &pr.assigned_reviewers {
                if !reviewer_ids.contains(reviewer_id) {
                    continue;
                }
                slots.push(ReviewerSlot {
                    pull_request_id: pr.pull_request_id.clone(),
                    reviewer_id: reviewer_id.clone(),
                    reviewer_team: tables.user(reviewer_id).and_then(|u| u.team_name.clone()),
                });
            }
        }
        Ok(slots)
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn statistics(&self) -> Result<Statistics> {
        let tables = self.tables.read().await;

        let open = tables
            .pull_requests
            .iter()
            .filter(|p| p.status == PrStatus::Open)
            .count() as i64;
        let total_prs = tables.pull_requests.len() as i64;
        let active = tables.users.iter().filter(|u| u.is_active).count() as i64;
        let total_users = tables.users.len() as i64;

        let mut counts: HashMap<&str, HashSet<&str>> = HashMap::new();
        for pr in &tables.pull_requests {
            for reviewer_id in &pr.assigned_reviewers {
                counts
                    .entry(reviewer_id.as_str())
                    .or_default()
                    .insert(pr.pull_request_id.as_str());
            }
        }
        let mut top_reviewers: Vec<ReviewerStat> = tables
            .users
            .iter()
            .filter_map(|u| {
                counts.get(u.user_id.as_str()).map(|prs| ReviewerStat {
                    user_id: u.user_id.clone(),
                    username: u.username.clone(),
                    review_count: prs.len() as i64,
                })
            })
            .collect();
        top_reviewers.sort_by(|a, b| {
            b.review_count
                .cmp(&a.review_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        top_reviewers.truncate(TOP_REVIEWERS_LIMIT);

        Ok(Statistics {
            pull_requests: PullRequestStats {
                total: total_prs,
                open,
                merged: total_prs - open,
            },
            users: UserStats {
                total: total_users,
                active,
                inactive: total_users - active,
            },
            teams: TeamStats {
                total: tables.teams.len() as i64,
            },
            top_reviewers,
        })
    }
}
