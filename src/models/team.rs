use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::utils::time::now;

/// A team and its members in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<User>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn new(team_name: impl Into<String>, members: Vec<User>) -> Self {
        Self {
            team_name: team_name.into(),
            members,
            created_at: now(),
        }
    }

}
