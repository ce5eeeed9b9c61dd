use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::bulk_deactivation::{BulkDeactivationResult, ReassignedPr, ReviewerSlot, SkippedPr};
use crate::services::pull_request_service::eligible_for;
use crate::services::reviewer_selector::ReviewerSelector;
use crate::store::{PullRequestStore, ReviewerSnapshotStore, TeamStore, UserStore};

const NO_CANDIDATE: &str = "no active replacement candidate in team";
const SELECT_FAILED: &str = "failed to select reviewer";

/// Deactivates a batch of team members and repairs the open PRs they review.
///
/// Deactivation is a single atomic write. Repairs run afterwards, one slot at
/// a time, and never undo the deactivation: a slot that cannot be repaired is
/// reported as skipped instead.
#[derive(Clone)]
pub struct BulkDeactivationService {
    users: Arc<dyn UserStore>,
    teams: Arc<dyn TeamStore>,
    prs: Arc<dyn PullRequestStore>,
    snapshots: Arc<dyn ReviewerSnapshotStore>,
    selector: ReviewerSelector,
}

impl BulkDeactivationService {
    pub fn new(
        users: Arc<dyn UserStore>,
        teams: Arc<dyn TeamStore>,
        prs: Arc<dyn PullRequestStore>,
        snapshots: Arc<dyn ReviewerSnapshotStore>,
        selector: ReviewerSelector,
    ) -> Self {
        Self {
            users,
            teams,
            prs,
            snapshots,
            selector,
        }
    }

    /// An empty `user_ids` targets every member of the team.
    pub async fn deactivate_users_and_reassign(
        &self,
        team_name: &str,
        user_ids: &[String],
    ) -> Result<BulkDeactivationResult> {
        if !self.teams.team_exists(team_name).await? {
            return Err(Error::team_not_found(team_name));
        }

        let targets = if user_ids.is_empty() {
            self.users
                .get_users_by_team(team_name)
                .await?
                .into_iter()
                .map(|u| u.user_id)
                .collect()
        } else {
            self.validate_targets(team_name, user_ids).await?
        };

        if targets.is_empty() {
            return Ok(BulkDeactivationResult::default());
        }

        // Taken before the write so the stale slots are still attributable.
        let snapshot = self.snapshots.open_prs_with_reviewers(&targets).await?;

        self.users.bulk_deactivate(&targets).await?;
        info!(team_name, count = targets.len(), "users deactivated");

        let mut result = BulkDeactivationResult {
            deactivated_users: targets,
            ..Default::default()
        };

        for slot in snapshot {
            match self.repair_slot(&slot).await {
                Ok(new_reviewer_id) => {
                    info!(
                        pr_id = %slot.pull_request_id,
                        old_reviewer_id = %slot.reviewer_id,
                        new_reviewer_id = %new_reviewer_id,
                        "stale reviewer replaced"
                    );
                    result.reassigned_prs.push(ReassignedPr {
                        pull_request_id: slot.pull_request_id,
                        old_reviewer_id: slot.reviewer_id,
                        new_reviewer_id,
                    });
                }
                Err(reason) => {
                    warn!(
                        pr_id = %slot.pull_request_id,
                        reviewer_id = %slot.reviewer_id,
                        %reason,
                        "reviewer slot left unrepaired"
                    );
                    result.skipped_prs.push(SkippedPr {
                        pull_request_id: slot.pull_request_id,
                        reason,
                    });
                }
            }
        }

        info!(
            team_name,
            reassigned = result.reassigned_prs.len(),
            skipped = result.skipped_prs.len(),
            "bulk deactivation finished"
        );
        Ok(result)
    }

    /// De-duplicates `user_ids` keeping first occurrence, and requires every
    /// id to be a current member of `team_name`.
    async fn validate_targets(&self, team_name: &str, user_ids: &[String]) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = user_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let found = self.users.get_users_by_ids(&unique).await?;
        for id in &unique {
            let member = found
                .iter()
                .any(|u| &u.user_id == id && u.belongs_to(team_name));
            if !member {
                return Err(Error::NotInTeam {
                    user_id: id.clone(),
                    team_name: team_name.to_string(),
                });
            }
        }
        Ok(unique)
    }

    /// Replacement pool: active members of the stale reviewer's team, minus
    /// the stale reviewer and whoever currently holds a slot on the PR.
    async fn repair_slot(&self, slot: &ReviewerSlot) -> std::result::Result<String, String> {
        let team_name = match slot.reviewer_team.as_deref() {
            Some(team) => team,
            None => return Err(NO_CANDIDATE.to_string()),
        };

        let candidates = self
            .users
            .active_team_members_excluding(team_name, &slot.reviewer_id)
            .await
            .map_err(|e| format!("failed to get candidates: {}", e))?;

        let pr = self
            .prs
            .get_pr(&slot.pull_request_id)
            .await
            .map_err(|e| format!("failed to get PR: {}", e))?;

        let available = eligible_for(&pr, candidates);
        if available.is_empty() {
            return Err(NO_CANDIDATE.to_string());
        }

        let new_reviewer_id = self
            .selector
            .select_random_reviewer(&available)
            .ok_or_else(|| SELECT_FAILED.to_string())?;

        self.prs
            .replace_reviewer(&slot.pull_request_id, &slot.reviewer_id, &new_reviewer_id)
            .await
            .map_err(|e| format!("failed to replace reviewer: {}", e))?;

        Ok(new_reviewer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pull_request::PullRequest;
    use crate::models::team::Team;
    use crate::models::user::User;
    use crate::services::reviewer_selector::tests::FirstCandidate;
    use crate::store::{
        MemoryStore, MockPullRequestStore, MockReviewerSnapshotStore, MockTeamStore,
        MockUserStore,
    };

    fn member(id: &str, team: &str) -> User {
        User::new(id, format!("name-{}", id), Some(team.to_string()), true)
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn seeded_store(team: &str, members: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let users = members.iter().map(|id| member(id, team)).collect();
        store.create_team(&Team::new(team, users)).await.unwrap();
        store
    }

    fn service(store: &Arc<MemoryStore>, selector: ReviewerSelector) -> BulkDeactivationService {
        BulkDeactivationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            selector,
        )
    }

    fn mocked(
        users: MockUserStore,
        teams: MockTeamStore,
        prs: MockPullRequestStore,
        snapshots: MockReviewerSnapshotStore,
    ) -> BulkDeactivationService {
        BulkDeactivationService::new(
            Arc::new(users),
            Arc::new(teams),
            Arc::new(prs),
            Arc::new(snapshots),
            ReviewerSelector::default(),
        )
    }

    fn stale_slot(pr_id: &str, reviewer_id: &str) -> ReviewerSlot {
        ReviewerSlot {
            pull_request_id: pr_id.into(),
            reviewer_id: reviewer_id.into(),
            reviewer_team: Some("bulk-team".into()),
        }
    }

    async fn open_pr(store: &MemoryStore, id: &str, author: &str, reviewers: &[&str]) {
        let mut pr = PullRequest::new(id, id, author);
        pr.assign_reviewers(ids(reviewers));
        store.create_pr(&pr).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store, ReviewerSelector::default());

        let err = svc
            .deactivate_users_and_reassign("ghost", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn empty_team_is_a_noop() {
        let mut teams = MockTeamStore::new();
        let mut users = MockUserStore::new();
        let mut prs = MockPullRequestStore::new();
        let mut snapshots = MockReviewerSnapshotStore::new();

        teams.expect_team_exists().returning(|_| Ok(true));
        users.expect_get_users_by_team().returning(|_| Ok(vec![]));
        users.expect_bulk_deactivate().never();
        snapshots.expect_open_prs_with_reviewers().never();
        prs.expect_replace_reviewer().never();

        let svc = mocked(users, teams, prs, snapshots);
        let result = svc.deactivate_users_and_reassign("empty", &[]).await.unwrap();
        assert_eq!(result, BulkDeactivationResult::default());
    }

    #[tokio::test]
    async fn repairs_stale_slot_with_remaining_member() {
        let store = seeded_store("bulk-team", &["b1", "b2", "b3", "b4"]).await;
        open_pr(&store, "bpr-1", "b1", &["b2", "b3"]).await;
        let svc = service(&store, ReviewerSelector::default());

        let result = svc
            .deactivate_users_and_reassign("bulk-team", &ids(&["b2"]))
            .await
            .unwrap();

        assert_eq!(result.deactivated_users, ids(&["b2"]));
        assert!(result.skipped_prs.is_empty());
        assert_eq!(
            result.reassigned_prs,
            vec![ReassignedPr {
                pull_request_id: "bpr-1".into(),
                old_reviewer_id: "b2".into(),
                new_reviewer_id: "b4".into(),
            }]
        );

        let pr = store.get_pr("bpr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, ids(&["b4", "b3"]));
        assert!(!store.get_user("b2").await.unwrap().is_active);
    }

    #[tokio::test]
    async fn whole_team_deactivation_skips_every_slot() {
        let store = seeded_store("bulk-team", &["b1", "b2", "b3", "b4"]).await;
        open_pr(&store, "bpr-1", "b1", &["b2", "b3"]).await;
        let svc = service(&store, ReviewerSelector::default());

        let result = svc
            .deactivate_users_and_reassign("bulk-team", &[])
            .await
            .unwrap();

        assert_eq!(result.deactivated_users, ids(&["b1", "b2", "b3", "b4"]));
        assert!(result.reassigned_prs.is_empty());
        assert_eq!(result.skipped_prs.len(), 2);
        assert!(result
            .skipped_prs
            .iter()
            .all(|s| s.pull_request_id == "bpr-1" && s.reason == NO_CANDIDATE));

        let pr = store.get_pr("bpr-1").await.unwrap();
        assert_eq!(pr.assigned_reviewers, ids(&["b2", "b3"]));
    }

    #[tokio::test]
    async fn merged_prs_are_not_touched() {
        let store = seeded_store("bulk-team", &["b1", "b2", "b3"]).await;
        open_pr(&store, "bpr-1", "b1", &["b2"]).await;
        let mut merged = store.get_pr("bpr-1").await.unwrap();
        merged.merge();
        store.update_pr(&merged).await.unwrap();
        let svc = service(&store, ReviewerSelector::new(Arc::new(FirstCandidate)));

        let result = svc
            .deactivate_users_and_reassign("bulk-team", &ids(&["b2"]))
            .await
            .unwrap();

        assert!(result.reassigned_prs.is_empty());
        assert!(result.skipped_prs.is_empty());
        assert_eq!(
            store.get_pr("bpr-1").await.unwrap().assigned_reviewers,
            ids(&["b2"])
        );
    }

    #[tokio::test]
    async fn duplicate_ids_are_collapsed() {
        let store = seeded_store("bulk-team", &["b1", "b2", "b3"]).await;
        let svc = service(&store, ReviewerSelector::default());

        let result = svc
            .deactivate_users_and_reassign("bulk-team", &ids(&["b2", "b2", "b1"]))
            .await
            .unwrap();
        assert_eq!(result.deactivated_users, ids(&["b2", "b1"]));
    }

    #[tokio::test]
    async fn outsider_fails_validation_without_writes() {
        let mut teams = MockTeamStore::new();
        let mut users = MockUserStore::new();
        let prs = MockPullRequestStore::new();
        let snapshots = MockReviewerSnapshotStore::new();

        teams.expect_team_exists().returning(|_| Ok(true));
        users.expect_get_users_by_ids().returning(|_| {
            Ok(vec![member("b1", "bulk-team"), member("x9", "other-team")])
        });
        users.expect_bulk_deactivate().never();

        let svc = BulkDeactivationService::new(
            Arc::new(users),
            Arc::new(teams),
            Arc::new(prs),
            Arc::new(snapshots),
            ReviewerSelector::default(),
        );
        let err = svc
            .deactivate_users_and_reassign("bulk-team", &ids(&["b1", "x9"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotInTeam { ref user_id, .. } if user_id == "x9"));
    }

    #[tokio::test]
    async fn failed_deactivation_write_aborts() {
        let mut teams = MockTeamStore::new();
        let mut users = MockUserStore::new();
        let mut prs = MockPullRequestStore::new();
        let mut snapshots = MockReviewerSnapshotStore::new();

        teams.expect_team_exists().returning(|_| Ok(true));
        users
            .expect_get_users_by_team()
            .returning(|name| Ok(vec![member("b1", name)]));
        snapshots.expect_open_prs_with_reviewers().returning(|_| {
            Ok(vec![ReviewerSlot {
                pull_request_id: "bpr-1".into(),
                reviewer_id: "b1".into(),
                reviewer_team: Some("bulk-team".into()),
            }])
        });
        users
            .expect_bulk_deactivate()
            .returning(|_| Err(Error::Internal("write failed".into())));
        prs.expect_replace_reviewer().never();

        let svc = BulkDeactivationService::new(
            Arc::new(users),
            Arc::new(teams),
            Arc::new(prs),
            Arc::new(snapshots),
            ReviewerSelector::default(),
        );
        let err = svc
            .deactivate_users_and_reassign("bulk-team", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[tokio::test]
    async fn repair_errors_become_skips() {
        let mut teams = MockTeamStore::new();
        let mut users = MockUserStore::new();
        let mut prs = MockPullRequestStore::new();
        let mut snapshots = MockReviewerSnapshotStore::new();

        teams.expect_team_exists().returning(|_| Ok(true));
        users.expect_get_users_by_ids().returning(|_| {
            Ok(vec![member("b2", "bulk-team")])
        });
        snapshots.expect_open_prs_with_reviewers().returning(|_| {
            Ok(vec![
                ReviewerSlot {
                    pull_request_id: "bpr-1".into(),
                    reviewer_id: "b2".into(),
                    reviewer_team: Some("bulk-team".into()),
                },
                ReviewerSlot {
                    pull_request_id: "bpr-2".into(),
                    reviewer_id: "b2".into(),
                    reviewer_team: Some("bulk-team".into()),
                },
            ])
        });
        users.expect_bulk_deactivate().times(1).returning(|_| Ok(()));
        users
            .expect_active_team_members_excluding()
            .returning(|team, _| Ok(vec![member("b3", team)]));
        prs.expect_get_pr().returning(|id| {
            if id == "bpr-1" {
                Err(Error::Internal("connection reset".into()))
            } else {
                let mut pr = PullRequest::new(id, id, "b1");
                pr.assign_reviewers(vec!["b2".into()]);
                Ok(pr)
            }
        });
        prs.expect_replace_reviewer()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let svc = BulkDeactivationService::new(
            Arc::new(users),
            Arc::new(teams),
            Arc::new(prs),
            Arc::new(snapshots),
            ReviewerSelector::default(),
        );
        let result = svc
            .deactivate_users_and_reassign("bulk-team", &ids(&["b2"]))
            .await
            .unwrap();

        assert_eq!(result.skipped_prs.len(), 1);
        assert_eq!(result.skipped_prs[0].pull_request_id, "bpr-1");
        assert!(result.skipped_prs[0].reason.starts_with("failed to get PR:"));
        assert_eq!(result.reassigned_prs.len(), 1);
        assert_eq!(result.reassigned_prs[0].new_reviewer_id, "b3");
    }

    #[tokio::test]
    async fn candidate_lookup_failure_becomes_skip() {
        let mut teams = MockTeamStore::new();
        let mut users = MockUserStore::new();
        let mut prs = MockPullRequestStore::new();
        let mut snapshots = MockReviewerSnapshotStore::new();

        teams.expect_team_exists().returning(|_| Ok(true));
        users
            .expect_get_users_by_ids()
            .returning(|_| Ok(vec![member("b2", "bulk-team")]));
        snapshots
            .expect_open_prs_with_reviewers()
            .returning(|_| Ok(vec![stale_slot("bpr-1", "b2")]));
        users.expect_bulk_deactivate().times(1).returning(|_| Ok(()));
        users
            .expect_active_team_members_excluding()
            .returning(|_, _| Err(Error::Internal("pool timed out".into())));
        prs.expect_get_pr().never();
        prs.expect_replace_reviewer().never();

        let svc = mocked(users, teams, prs, snapshots);
        let result = svc
            .deactivate_users_and_reassign("bulk-team", &ids(&["b2"]))
            .await
            .unwrap();

        assert_eq!(result.deactivated_users, ids(&["b2"]));
        assert!(result.reassigned_prs.is_empty());
        assert_eq!(
            result.skipped_prs,
            vec![SkippedPr {
                pull_request_id: "bpr-1".into(),
                reason: "failed to get candidates: Internal error: pool timed out".into(),
            }]
        );
    }

    #[tokio::test]
    async fn pr_merged_after_snapshot_becomes_skip() {
        let mut teams = MockTeamStore::new();
        let mut users = MockUserStore::new();
        let mut prs = MockPullRequestStore::new();
        let mut snapshots = MockReviewerSnapshotStore::new();

        teams.expect_team_exists().returning(|_| Ok(true));
        users
            .expect_get_users_by_ids()
            .returning(|_| Ok(vec![member("b2", "bulk-team")]));
        snapshots
            .expect_open_prs_with_reviewers()
            .returning(|_| Ok(vec![stale_slot("bpr-1", "b2")]));
        users.expect_bulk_deactivate().times(1).returning(|_| Ok(()));
        users
            .expect_active_team_members_excluding()
            .returning(|team, _| Ok(vec![member("b3", team)]));
        prs.expect_get_pr().returning(|id| {
            let mut pr = PullRequest::new(id, id, "b1");
            pr.assign_reviewers(vec!["b2".into()]);
            Ok(pr)
        });
        prs.expect_replace_reviewer()
            .times(1)
            .returning(|pr_id, _, _| Err(Error::PrMerged(pr_id.to_string())));

        let svc = mocked(users, teams, prs, snapshots);
        let result = svc
            .deactivate_users_and_reassign("bulk-team", &ids(&["b2"]))
            .await
            .unwrap();

        assert!(result.reassigned_prs.is_empty());
        assert_eq!(
            result.skipped_prs,
            vec![SkippedPr {
                pull_request_id: "bpr-1".into(),
                reason: "failed to replace reviewer: pull request 'bpr-1' is merged and cannot be modified"
                    .into(),
            }]
        );
    }
}
