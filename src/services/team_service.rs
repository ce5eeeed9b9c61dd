use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::team::Team;
use crate::models::user::User;
use crate::store::TeamStore;

/// Member as submitted with a new team.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamStore>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamStore>) -> Self {
        Self { teams }
    }

    /// Creates the team and moves every listed member into it. Existing users
    /// are updated in place.
    pub async fn create_team(&self, team_name: &str, members: Vec<NewMember>) -> Result<Team> {
        if let Some(dup) = first_duplicate(&members) {
            return Err(Error::BadRequest(format!(
                "user '{}' listed more than once",
                dup
            )));
        }

        let users = members
            .into_iter()
            .map(|m| User::new(m.user_id, m.username, Some(team_name.to_string()), m.is_active))
            .collect();
        self.teams.create_team(&Team::new(team_name, users)).await?;
        info!(team_name, "team created");

        self.teams.get_team(team_name).await
    }

    pub async fn get_team(&self, team_name: &str) -> Result<Team> {
        self.teams.get_team(team_name).await
    }
}

fn first_duplicate(members: &[NewMember]) -> Option<&str> {
    members.iter().enumerate().find_map(|(i, m)| {
        members[..i]
            .iter()
            .any(|prev| prev.user_id == m.user_id)
            .then_some(m.user_id.as_str())
    })
}
