use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::time::now;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        team_name: Option<String>,
        is_active: bool,
    ) -> Self {
        let ts = now();
        Self {
            user_id: user_id.into(),
            username: username.into(),
            team_name,
            is_active,
            created_at: ts,
            updated_at: ts,
        }
    }

    pub fn belongs_to(&self, team_name: &str) -> bool {
        self.team_name.as_deref() == Some(team_name)
    }
}
