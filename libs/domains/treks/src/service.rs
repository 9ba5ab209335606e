use std::sync::Arc;
use uuid::Uuid;

use crate::error::{TrekError, TrekResult};
use crate::models::{CreateComment, TourRating, Trek, TrekComment, TrekDetail};
use crate::repository::TrekRepository;

/// Service layer for the trek catalog
pub struct TrekService<R: TrekRepository> {
    repository: Arc<R>,
}

impl<R: TrekRepository> Clone for TrekService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: TrekRepository> TrekService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn get_trek(&self, tour_id: i64) -> TrekResult<Option<Trek>> {
        self.repository.get_by_id(tour_id).await
    }

    /// Trek with its comments
    pub async fn get_detail(&self, tour_id: i64) -> TrekResult<TrekDetail> {
        let trek = self
            .repository
            .get_by_id(tour_id)
            .await?
            .ok_or(TrekError::NotFound(tour_id))?;
        let comments = self.repository.list_comments(tour_id).await?;

        Ok(TrekDetail { trek, comments })
    }

    pub async fn add_comment(
        &self,
        user_id: Uuid,
        tour_id: i64,
        input: CreateComment,
    ) -> TrekResult<TrekComment> {
        if self.repository.get_by_id(tour_id).await?.is_none() {
            return Err(TrekError::NotFound(tour_id));
        }

        let comment = TrekComment::new(user_id, tour_id, input);
        self.repository.create_comment(comment).await
    }

    pub async fn recent_ratings(&self, user_id: Uuid, limit: u64) -> TrekResult<Vec<TourRating>> {
        self.repository.recent_ratings_by_user(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockTrekRepository;
    use mockall::predicate;

    fn trek(tour_id: i64) -> Trek {
        Trek {
            tour_id,
            title: "Glacier view".to_string(),
            route_type: "Loop".to_string(),
            difficulty: Some("hard".to_string()),
            short_description: String::new(),
            long_description: String::new(),
            images: vec![],
            cover_image: None,
            amenities: serde_json::json!({}),
            tags: vec![],
            best_months: vec![],
            url: String::new(),
            map_url: String::new(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[tokio::test]
    async fn test_get_detail_missing_trek() {
        let mut mock_repo = MockTrekRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(predicate::eq(5))
            .returning(|_| Ok(None));
        mock_repo.expect_list_comments().never();

        let service = TrekService::new(mock_repo);
        let result = service.get_detail(5).await;

        assert!(matches!(result, Err(TrekError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_get_detail_includes_comments() {
        let user_id = Uuid::now_v7();
        let mut mock_repo = MockTrekRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(|id| Ok(Some(trek(id))));
        mock_repo
            .expect_list_comments()
            .with(predicate::eq(5))
            .returning(move |id| {
                Ok(vec![TrekComment::new(
                    user_id,
                    id,
                    CreateComment {
                        rating: Some(3.0),
                        text: "Windy".to_string(),
                        images: vec![],
                    },
                )])
            });

        let service = TrekService::new(mock_repo);
        let detail = service.get_detail(5).await.unwrap();

        assert_eq!(detail.trek.tour_id, 5);
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].text, "Windy");
    }

    #[tokio::test]
    async fn test_add_comment_checks_trek_exists() {
        let mut mock_repo = MockTrekRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));
        mock_repo.expect_create_comment().never();

        let service = TrekService::new(mock_repo);
        let result = service
            .add_comment(
                Uuid::now_v7(),
                9,
                CreateComment {
                    rating: None,
                    text: "Nice".to_string(),
                    images: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(TrekError::NotFound(9))));
    }

    #[tokio::test]
    async fn test_add_comment_stores_author() {
        let user_id = Uuid::now_v7();
        let mut mock_repo = MockTrekRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(|id| Ok(Some(trek(id))));
        mock_repo
            .expect_create_comment()
            .withf(move |c| c.user_id == user_id && c.trek_id == 9 && c.rating == Some(4.0))
            .returning(Ok);

        let service = TrekService::new(mock_repo);
        let comment = service
            .add_comment(
                user_id,
                9,
                CreateComment {
                    rating: Some(4.0),
                    text: String::new(),
                    images: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(comment.user_id, user_id);
    }
}
