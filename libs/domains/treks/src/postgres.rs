use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::{
    entity::{comment, trek},
    error::{TrekError, TrekResult},
    models::{TourRating, Trek, TrekComment},
    repository::TrekRepository,
};

/// PostgreSQL-backed catalog
#[derive(Clone)]
pub struct PgTrekRepository {
    db: DatabaseConnection,
}

impl PgTrekRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TrekRepository for PgTrekRepository {
    async fn get_by_id(&self, tour_id: i64) -> TrekResult<Option<Trek>> {
        let model = trek::Entity::find_by_id(tour_id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_comments(&self, tour_id: i64) -> TrekResult<Vec<TrekComment>> {
        let models = comment::Entity::find()
            .filter(comment::Column::TrekId.eq(tour_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn create_comment(&self, input: TrekComment) -> TrekResult<TrekComment> {
        let trek_id = input.trek_id;
        let active_model: comment::ActiveModel = (&input).into();

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if let Some(SqlErr::ForeignKeyConstraintViolation(_)) = e.sql_err() {
                TrekError::NotFound(trek_id)
            } else {
                e.into()
            }
        })?;

        tracing::info!(comment_id = %model.id, trek_id, "Created trek comment");
        Ok(model.into())
    }

    async fn recent_ratings_by_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> TrekResult<Vec<TourRating>> {
        let models = comment::Entity::find()
            .filter(comment::Column::UserId.eq(user_id))
            .filter(comment::Column::Rating.is_not_null())
            .order_by_desc(comment::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .filter_map(|m| {
                m.rating.map(|rating| TourRating {
                    tour_id: m.trek_id,
                    rating,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn trek_model(tour_id: i64) -> trek::Model {
        let now = chrono::Utc::now();
        trek::Model {
            tour_id,
            title: "Panorama ridge".to_string(),
            route_type: "Out & back".to_string(),
            difficulty: None,
            short_description: "Short".to_string(),
            long_description: "Long".to_string(),
            images: json!([{ "url": "https://img.example/1.jpg" }]),
            cover_image: Some(json!({ "url": "https://img.example/cover.jpg", "score": 0.8 })),
            amenities: json!({ "duration": { "value": 150 } }),
            tags: json!(["lake"]),
            best_months: json!(["June", "July"]),
            url: String::new(),
            map_url: String::new(),
            latitude: 46.1,
            longitude: 7.2,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_decodes_json_columns() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![trek_model(42)]])
            .into_connection();
        let repo = PgTrekRepository::new(db);

        let trek = repo.get_by_id(42).await.unwrap().unwrap();
        assert_eq!(trek.images.len(), 1);
        assert_eq!(
            trek.cover_image.clone().map(|c| c.url),
            Some("https://img.example/cover.jpg".to_string())
        );
        assert_eq!(trek.duration_minutes(), Some(150));
        assert_eq!(trek.best_months, vec!["June", "July"]);
    }

    #[tokio::test]
    async fn test_recent_ratings_maps_rows() {
        let user_id = Uuid::now_v7();
        let now = chrono::Utc::now();
        let rows = vec![comment::Model {
            id: Uuid::now_v7(),
            user_id,
            trek_id: 7,
            rating: Some(4.5),
            text: String::new(),
            images: json!([]),
            created_at: now.into(),
        }];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection();
        let repo = PgTrekRepository::new(db);

        let ratings = repo.recent_ratings_by_user(user_id, 10).await.unwrap();
        assert_eq!(ratings, vec![TourRating { tour_id: 7, rating: 4.5 }]);
    }
}
