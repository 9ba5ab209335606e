use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::Json;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{Coordinate, PreferenceProfile, User},
    repository::UserRepository,
};

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn update_error(id: Uuid, err: DbErr) -> UserError {
    match err {
        DbErr::RecordNotUpdated => UserError::NotFound(id),
        other => other.into(),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let active_model: entity::ActiveModel = (&user).into();

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
                UserError::DuplicateUserName(user.user_name.clone())
            } else {
                e.into()
            }
        })?;

        tracing::info!(user_id = %model.id, "Created user");
        model.try_into()
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        model.map(User::try_from).transpose()
    }

    async fn get_by_user_name(&self, user_name: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(entity::Column::UserName.eq(user_name))
            .one(&self.db)
            .await?;
        model.map(User::try_from).transpose()
    }

    async fn update_location(&self, id: Uuid, location: Coordinate) -> UserResult<User> {
        let active_model = entity::ActiveModel {
            id: Set(id),
            latitude: Set(Some(location.latitude)),
            longitude: Set(Some(location.longitude)),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| update_error(id, e))?;

        tracing::debug!(user_id = %id, "Updated user location");
        model.try_into()
    }

    async fn update_preferences(&self, id: Uuid, profile: PreferenceProfile) -> UserResult<User> {
        let active_model = entity::ActiveModel {
            id: Set(id),
            liked_embedding: Set(Json::from(profile.liked_embedding)),
            disliked_embedding: Set(Json::from(profile.disliked_embedding)),
            liked_tours: Set(Json::from(profile.liked_tours)),
            disliked_tours: Set(Json::from(profile.disliked_tours)),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| update_error(id, e))?;

        tracing::debug!(user_id = %id, "Updated user preferences");
        model.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn model(id: Uuid, name: &str) -> entity::Model {
        let now = chrono::Utc::now();
        entity::Model {
            id,
            user_name: name.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Hill".to_string(),
            password_hash: "hash".to_string(),
            liked_embedding: serde_json::json!([0.0, 1.0]),
            disliked_embedding: serde_json::json!([0.0, 0.0]),
            liked_tours: serde_json::json!([12, 7]),
            disliked_tours: serde_json::json!([]),
            latitude: Some(47.0),
            longitude: Some(8.0),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_user_name_maps_json_columns() {
        let id = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(id, "summit")]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let user = repo.get_by_user_name("summit").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.liked_embedding, vec![0.0, 1.0]);
        assert_eq!(user.liked_tours, vec![12, 7]);
        assert_eq!(user.location, Some(Coordinate::new(47.0, 8.0)));
    }

    #[tokio::test]
    async fn test_get_by_id_missing_returns_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgUserRepository::new(db);

        assert!(repo.get_by_id(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_failure_is_internal() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo.get_by_id(Uuid::now_v7()).await;
        assert!(matches!(result, Err(UserError::Internal(msg)) if msg.contains("connection reset")));
    }

    #[tokio::test]
    async fn test_corrupt_embedding_column_fails_the_read() {
        let id = Uuid::now_v7();
        let mut corrupt = model(id, "summit");
        corrupt.liked_embedding = serde_json::json!("garbage");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![corrupt]])
            .into_connection();
        let repo = PgUserRepository::new(db);

        let result = repo.get_by_id(id).await;
        assert!(matches!(result, Err(UserError::Internal(msg)) if msg.contains("liked_embedding")));
    }
}
