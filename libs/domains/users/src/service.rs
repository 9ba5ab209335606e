use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::embedding::{self, FeedbackEntry};
use crate::error::{UserError, UserResult};
use crate::models::{Coordinate, FeedbackRequest, FeedbackSummary, SignIn, SignUp, User};
use crate::repository::UserRepository;

/// Default length of the preference vectors
pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    embedding_dim: usize,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            embedding_dim: self.embedding_dim,
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_embedding_dim(repository, DEFAULT_EMBEDDING_DIM)
    }

    pub fn with_embedding_dim(repository: R, embedding_dim: usize) -> Self {
        Self {
            repository: Arc::new(repository),
            embedding_dim,
        }
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Register a user with zeroed preference vectors.
    ///
    /// User names are stored lower-cased.
    #[instrument(skip(self, input), fields(user_name = %input.user_name))]
    pub async fn sign_up(&self, input: SignUp) -> UserResult<User> {
        let user_name = input.user_name.trim().to_lowercase();

        if self.repository.get_by_user_name(&user_name).await?.is_some() {
            return Err(UserError::DuplicateUserName(user_name));
        }

        let password_hash = hash_password(&input.password)?;
        let user = User::new(
            user_name,
            input.first_name,
            input.last_name,
            password_hash,
            self.embedding_dim,
        );

        self.repository.create(user).await
    }

    /// Verify credentials. Unknown names and wrong passwords fail the same way.
    #[instrument(skip(self, input), fields(user_name = %input.user_name))]
    pub async fn sign_in(&self, input: SignIn) -> UserResult<User> {
        let user_name = input.user_name.trim().to_lowercase();

        let user = self
            .repository
            .get_by_user_name(&user_name)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    pub async fn get_location(&self, id: Uuid) -> UserResult<Coordinate> {
        self.get_user(id).await?.location.ok_or(UserError::LocationNotSet)
    }

    pub async fn set_location(&self, id: Uuid, location: Coordinate) -> UserResult<User> {
        if !(-90.0..=90.0).contains(&location.latitude)
            || !(-180.0..=180.0).contains(&location.longitude)
        {
            return Err(UserError::Validation(format!(
                "Coordinate out of range: ({}, {})",
                location.latitude, location.longitude
            )));
        }
        self.repository.update_location(id, location).await
    }

    /// Fold quiz answers into the user's preference vectors and rating history.
    #[instrument(skip(self, request), fields(answers = request.answer.len()))]
    pub async fn submit_feedback(
        &self,
        id: Uuid,
        request: FeedbackRequest,
    ) -> UserResult<FeedbackSummary> {
        let user = self.get_user(id).await?;

        let FeedbackRequest {
            answer,
            mut embeddings,
        } = request;
        let entries: Vec<FeedbackEntry> = answer
            .into_iter()
            .map(|(tour_id, liked)| FeedbackEntry {
                tour_id,
                liked,
                embedding: embeddings.remove(&tour_id),
            })
            .collect();

        let outcome = embedding::apply_feedback(&user.preferences(), &entries, self.embedding_dim);
        let updated = self
            .repository
            .update_preferences(id, outcome.profile)
            .await?;

        tracing::info!(
            user_id = %id,
            rated = entries.len(),
            skipped = outcome.skipped,
            "Updated preference embeddings"
        );

        Ok(FeedbackSummary {
            liked_tours: updated.liked_tours,
            disliked_tours: updated.disliked_tours,
            skipped: outcome.skipped,
        })
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
