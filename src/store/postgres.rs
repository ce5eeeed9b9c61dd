use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{PullRequestStore, ReviewerSnapshotStore, StatsStore, TeamStore, UserStore};
use crate::error::{Error, Result};
use crate::models::bulk_deactivation::ReviewerSlot;
use crate::models::pull_request::{PrStatus, PullRequest};
use crate::models::statistics::{
    PullRequestStats, ReviewerStat, Statistics, TeamStats, UserStats, TOP_REVIEWERS_LIMIT,
};
use crate::models::team::Team;
use crate::models::user::User;

const USER_COLUMNS: &str = "user_id, username, team_name, is_active, created_at, updated_at";

/// Selects PRs with their reviewers aggregated in slot order.
const PR_SELECT: &str = r#"
    SELECT
        pr.pull_request_id,
        pr.pull_request_name,
        pr.author_id,
        pr.status,
        pr.created_at,
        pr.updated_at,
        pr.merged_at,
        COALESCE(
            ARRAY_AGG(r.reviewer_id ORDER BY r.slot) FILTER (WHERE r.reviewer_id IS NOT NULL),
            ARRAY[]::TEXT[]
        ) AS assigned_reviewers
    FROM pull_requests pr
    LEFT JOIN pr_reviewers r ON r.pull_request_id = pr.pull_request_id
"#;

#[derive(FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
    assigned_reviewers: Vec<String>,
}

impl TryFrom<PullRequestRow> for PullRequest {
    type Error = Error;

    fn try_from(row: PullRequestRow) -> Result<Self> {
        Ok(PullRequest {
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
            status: row.status.parse()?,
            assigned_reviewers: row.assigned_reviewers,
            created_at: row.created_at,
            updated_at: row.updated_at,
            merged_at: row.merged_at,
        })
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn team_members(&self, team_name: &str) -> Result<Vec<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE team_name = $1 ORDER BY seq",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(team_name)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_user(&self, user_id: &str) -> Result<User> {
        let query = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::user_not_found(user_id))
    }

    async fn get_users_by_team(&self, team_name: &str) -> Result<Vec<User>> {
        self.team_members(team_name).await
    }

    async fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {} FROM users WHERE user_id = ANY($1) ORDER BY seq",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn active_team_members_excluding(
        &self,
        team_name: &str,
        exclude_user_id: &str,
    ) -> Result<Vec<User>> {
        let query = format!(
            r#"
            SELECT {}
            FROM users
            WHERE team_name = $1 AND is_active = TRUE AND user_id <> $2
            ORDER BY seq
            "#,
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(team_name)
            .bind(exclude_user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let query = format!(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::user_not_found(user_id))
    }

    async fn bulk_deactivate(&self, user_ids: &[String]) -> Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        let updated: Vec<String> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET is_active = FALSE, updated_at = NOW()
            WHERE user_id = ANY($1)
            RETURNING user_id
            "#,
        )
        .bind(user_ids)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(missing) = user_ids.iter().find(|id| !updated.contains(*id)) {
            tx.rollback().await?;
            return Err(Error::user_not_found(missing.as_str()));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl TeamStore for PgStore {
    async fn create_team(&self, team: &Team) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO teams (team_name, created_at)
            VALUES ($1, $2)
            ON CONFLICT (team_name) DO NOTHING
            "#,
        )
        .bind(&team.team_name)
        .bind(team.created_at)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(Error::TeamExists(team.team_name.clone()));
        }

        for member in &team.members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_name, is_active, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (user_id) DO UPDATE
                SET username = EXCLUDED.username,
                    team_name = EXCLUDED.team_name,
                    is_active = EXCLUDED.is_active,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(&member.team_name)
            .bind(member.is_active)
            .bind(member.created_at)
            .bind(member.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_team(&self, team_name: &str) -> Result<Team> {
        let created_at: DateTime<Utc> =
            sqlx::query_scalar("SELECT created_at FROM teams WHERE team_name = $1")
                .bind(team_name)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::team_not_found(team_name))?;

        Ok(Team {
            team_name: team_name.to_string(),
            members: self.team_members(team_name).await?,
            created_at,
        })
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = $1)")
                .bind(team_name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

async fn lock_pr_status(tx: &mut Transaction<'_, Postgres>, pr_id: &str) -> Result<PrStatus> {
    let status: String =
        sqlx::query_scalar("SELECT status FROM pull_requests WHERE pull_request_id = $1 FOR UPDATE")
            .bind(pr_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| Error::pr_not_found(pr_id))?;
    status.parse()
}

#[async_trait]
impl PullRequestStore for PgStore {
    async fn create_pr(&self, pr: &PullRequest) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO pull_requests
                (pull_request_id, pull_request_name, author_id, status, created_at, updated_at, merged_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (pull_request_id) DO NOTHING
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.updated_at)
        .bind(pr.merged_at)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(Error::PrExists(pr.pull_request_id.clone()));
        }

        for (slot, reviewer_id) in pr.assigned_reviewers.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO pr_reviewers (pull_request_id, slot, reviewer_id, assigned_at)
                VALUES ($1, $2, $3, NOW())
                "#,
            )
            .bind(&pr.pull_request_id)
            .bind(slot as i16)
            .bind(reviewer_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_pr(&self, pr_id: &str) -> Result<PullRequest> {
        let query = format!(
            "{} WHERE pr.pull_request_id = $1 GROUP BY pr.pull_request_id",
            PR_SELECT
        );
        sqlx::query_as::<_, PullRequestRow>(&query)
            .bind(pr_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::pr_not_found(pr_id))?
            .try_into()
    }

    async fn update_pr(&self, pr: &PullRequest) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE pull_requests
            SET pull_request_name = $2,
                status = $3,
                updated_at = $4,
                merged_at = COALESCE(merged_at, $5)
            WHERE pull_request_id = $1
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(pr.status.as_str())
        .bind(pr.updated_at)
        .bind(pr.merged_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::pr_not_found(pr.pull_request_id.as_str()));
        }
        Ok(())
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if lock_pr_status(&mut tx, pr_id).await? == PrStatus::Merged {
            return Err(Error::PrMerged(pr_id.to_string()));
        }

        let updated = sqlx::query(
            r#"
            UPDATE pr_reviewers
            SET reviewer_id = $3, assigned_at = NOW()
            WHERE pull_request_id = $1 AND reviewer_id = $2
            "#,
        )
        .bind(pr_id)
        .bind(old_reviewer_id)
        .bind(new_reviewer_id)
        .execute(&mut *tx)
        .await;

        let updated = match updated {
            Ok(result) => result,
            Err(err) if is_unique_violation(&err) => {
                return Err(Error::AlreadyAssigned {
                    user_id: new_reviewer_id.to_string(),
                    pr_id: pr_id.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        if updated.rows_affected() != 1 {
            return Err(Error::NotAssigned {
                user_id: old_reviewer_id.to_string(),
                pr_id: pr_id.to_string(),
            });
        }

        sqlx::query("UPDATE pull_requests SET updated_at = NOW() WHERE pull_request_id = $1")
            .bind(pr_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn prs_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequest>> {
        let query = format!(
            r#"
            {}
            WHERE EXISTS (
                SELECT 1 FROM pr_reviewers mine
                WHERE mine.pull_request_id = pr.pull_request_id AND mine.reviewer_id = $1
            )
            GROUP BY pr.pull_request_id
            ORDER BY pr.seq DESC
            "#,
            PR_SELECT
        );
        let rows = sqlx::query_as::<_, PullRequestRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(PullRequest::try_from).collect()
    }

    async fn pr_exists(&self, pr_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pull_requests WHERE pull_request_id = $1)",
        )
        .bind(pr_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl ReviewerSnapshotStore for PgStore {
    async fn open_prs_with_reviewers(&self, reviewer_ids: &[String]) -> Result<Vec<ReviewerSlot>> {
        if reviewer_ids.is_empty() {
            return Ok(Vec::new());
        }
        let slots = sqlx::query_as::<_, ReviewerSlot>(
            r#"
            SELECT pr.pull_request_id, r.reviewer_id, u.team_name AS reviewer_team
            FROM pull_requests pr
            INNER JOIN pr_reviewers r ON r.pull_request_id = pr.pull_request_id
            INNER JOIN users u ON u.user_id = r.reviewer_id
            WHERE pr.status = 'OPEN' AND r.reviewer_id = ANY($1)
            ORDER BY pr.seq, r.slot
            "#,
        )
        .bind(reviewer_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }
}

#[async_trait]
impl StatsStore for PgStore {
    async fn statistics(&self) -> Result<Statistics> {
        let (pr_total, pr_open, pr_merged): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'OPEN'),
                COUNT(*) FILTER (WHERE status = 'MERGED')
            FROM pull_requests
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let (user_total, user_active, user_inactive): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE is_active = TRUE),
                COUNT(*) FILTER (WHERE is_active = FALSE)
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let team_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams")
            .fetch_one(&self.pool)
            .await?;

        let top_reviewers = sqlx::query_as::<_, ReviewerStat>(
            r#"
            SELECT u.user_id, u.username, COUNT(DISTINCT r.pull_request_id) AS review_count
            FROM users u
            INNER JOIN pr_reviewers r ON r.reviewer_id = u.user_id
            GROUP BY u.user_id, u.username
            ORDER BY review_count DESC, u.user_id
            LIMIT $1
            "#,
        )
        .bind(TOP_REVIEWERS_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Statistics {
            pull_requests: PullRequestStats {
                total: pr_total,
                open: pr_open,
                merged: pr_merged,
            },
            users: UserStats {
                total: user_total,
                active: user_active,
                inactive: user_inactive,
            },
            teams: TeamStats { total: team_total },
            top_reviewers,
        })
    }
}
