use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::error::{TrekError, TrekResult};
use crate::models::{TourRating, Trek, TrekComment};

/// Catalog store
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait TrekRepository: Send + Sync {
    async fn get_by_id(&self, tour_id: i64) -> TrekResult<Option<Trek>>;

    /// Comments for a trek, newest first
    async fn list_comments(&self, tour_id: i64) -> TrekResult<Vec<TrekComment>>;

    async fn create_comment(&self, comment: TrekComment) -> TrekResult<TrekComment>;

    /// The user's most recent rated comments, newest first
    async fn recent_ratings_by_user(&self, user_id: Uuid, limit: u64)
    -> TrekResult<Vec<TourRating>>;
}

/// In-memory implementation of TrekRepository (for development/testing)
#[derive(Clone, Default)]
pub struct InMemoryTrekRepository {
    treks: Arc<RwLock<HashMap<i64, Trek>>>,
    comments: Arc<RwLock<Vec<TrekComment>>>,
}

impl InMemoryTrekRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_treks(treks: impl IntoIterator<Item = Trek>) -> Self {
        let repo = Self::new();
        if let Ok(mut map) = repo.treks.write() {
            map.extend(treks.into_iter().map(|t| (t.tour_id, t)));
        }
        repo
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> TrekError {
    TrekError::Internal(e.to_string())
}

#[async_trait]
impl TrekRepository for InMemoryTrekRepository {
    async fn get_by_id(&self, tour_id: i64) -> TrekResult<Option<Trek>> {
        let treks = self.treks.read().map_err(poisoned)?;
        Ok(treks.get(&tour_id).cloned())
    }

    async fn list_comments(&self, tour_id: i64) -> TrekResult<Vec<TrekComment>> {
        let comments = self.comments.read().map_err(poisoned)?;
        let mut found: Vec<TrekComment> = comments
            .iter()
            .filter(|c| c.trek_id == tour_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn create_comment(&self, comment: TrekComment) -> TrekResult<TrekComment> {
        if !self.treks.read().map_err(poisoned)?.contains_key(&comment.trek_id) {
            return Err(TrekError::NotFound(comment.trek_id));
        }
        self.comments.write().map_err(poisoned)?.push(comment.clone());
        Ok(comment)
    }

    async fn recent_ratings_by_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> TrekResult<Vec<TourRating>> {
        let comments = self.comments.read().map_err(poisoned)?;
        let mut rated: Vec<&TrekComment> = comments
            .iter()
            .filter(|c| c.user_id == user_id && c.rating.is_some())
            .collect();
        rated.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(rated
            .into_iter()
            .take(limit as usize)
            .filter_map(|c| {
                c.rating.map(|rating| TourRating {
                    tour_id: c.trek_id,
                    rating,
                })
            })
            .collect())
    }
}
