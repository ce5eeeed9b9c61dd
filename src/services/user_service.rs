use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::models::user::User;
use crate::store::UserStore;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Toggles availability only. Existing reviewer slots are left as they are.
    pub async fn set_is_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let user = self.users.set_user_active(user_id, is_active).await?;
        info!(user_id, is_active, "user activity changed");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::team::Team;
    use crate::store::{MemoryStore, TeamStore, UserStore};

    #[tokio::test]
    async fn toggles_activity() {
        let store = Arc::new(MemoryStore::new());
        store
            .create_team(&Team::new(
                "backend",
                vec![User::new("u1", "Alice", Some("backend".into()), true)],
            ))
            .await
            .unwrap();
        let svc = UserService::new(store.clone());

        let user = svc.set_is_active("u1", false).await.unwrap();
        assert!(!user.is_active);
        assert!(!store.get_user("u1").await.unwrap().is_active);

        let err = svc.set_is_active("nobody", true).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
