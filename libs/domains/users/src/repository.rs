use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Coordinate, PreferenceProfile, User};

/// Repository trait for User persistence
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `DuplicateUserName` when the name is taken.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Look up by (already lower-cased) user name
    async fn get_by_user_name(&self, user_name: &str) -> UserResult<Option<User>>;

    async fn update_location(&self, id: Uuid, location: Coordinate) -> UserResult<User>;

    /// Write both preference vectors and both tour windows in one update
    async fn update_preferences(&self, id: Uuid, profile: PreferenceProfile) -> UserResult<User>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn modify(&self, id: Uuid, f: impl FnOnce(&mut User)) -> UserResult<User> {
        let mut users = self
            .users
            .write()
            .map_err(|e| UserError::Internal(e.to_string()))?;
        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;
        f(user);
        Ok(user.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self
            .users
            .write()
            .map_err(|e| UserError::Internal(e.to_string()))?;

        if users.values().any(|u| u.user_name == user.user_name) {
            return Err(UserError::DuplicateUserName(user.user_name));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| UserError::Internal(e.to_string()))?;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_user_name(&self, user_name: &str) -> UserResult<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| UserError::Internal(e.to_string()))?;
        Ok(users.values().find(|u| u.user_name == user_name).cloned())
    }

    async fn update_location(&self, id: Uuid, location: Coordinate) -> UserResult<User> {
        self.modify(id, |user| {
            user.location = Some(location);
            user.updated_at = chrono::Utc::now();
        })
    }

    async fn update_preferences(&self, id: Uuid, profile: PreferenceProfile) -> UserResult<User> {
        self.modify(id, |user| user.apply_preferences(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User::new(
            name.to_string(),
            "First".to_string(),
            "Last".to_string(),
            "hash".to_string(),
            4,
        )
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("alpine")).await.unwrap();

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.user_name, "alpine");

        let by_name = repo.get_by_user_name("alpine").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);

        assert!(repo.get_by_user_name("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_name_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("alpine")).await.unwrap();

        let result = repo.create(user("alpine")).await;
        assert!(matches!(result, Err(UserError::DuplicateUserName(name)) if name == "alpine"));
    }

    #[tokio::test]
    async fn test_update_location() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("alpine")).await.unwrap();

        let updated = repo
            .update_location(created.id, Coordinate::new(45.8, 6.9))
            .await
            .unwrap();
        assert_eq!(updated.location, Some(Coordinate::new(45.8, 6.9)));
    }

    #[tokio::test]
    async fn test_update_preferences_writes_all_fields() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("alpine")).await.unwrap();

        let profile = PreferenceProfile {
            liked_embedding: vec![1.0, 0.0, 0.0, 0.0],
            disliked_embedding: vec![0.0, 1.0, 0.0, 0.0],
            liked_tours: vec![3],
            disliked_tours: vec![9],
        };
        let updated = repo
            .update_preferences(created.id, profile.clone())
            .await
            .unwrap();

        assert_eq!(updated.preferences(), profile);
        let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.preferences(), profile);
    }

    #[tokio::test]
    async fn test_updates_on_missing_user_fail() {
        let repo = InMemoryUserRepository::new();
        let id = Uuid::now_v7();

        let result = repo.update_location(id, Coordinate::new(0.0, 0.0)).await;
        assert!(matches!(result, Err(UserError::NotFound(missing)) if missing == id));

        let result = repo
            .update_preferences(id, PreferenceProfile::default())
            .await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
