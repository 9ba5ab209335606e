use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Coordinate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique login name
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Unit-length (or zero) preference vectors
    pub liked_embedding: Vec<f32>,
    pub disliked_embedding: Vec<f32>,
    /// Most recent rated tour ids, oldest first
    pub liked_tours: Vec<i64>,
    pub disliked_tours: Vec<i64>,
    pub location: Option<Coordinate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New user with zero preference vectors of `embedding_dim` and no history.
    pub fn new(
        user_name: String,
        first_name: String,
        last_name: String,
        password_hash: String,
        embedding_dim: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_name,
            first_name,
            last_name,
            password_hash,
            liked_embedding: vec![0.0; embedding_dim],
            disliked_embedding: vec![0.0; embedding_dim],
            liked_tours: Vec::new(),
            disliked_tours: Vec::new(),
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn preferences(&self) -> PreferenceProfile {
        PreferenceProfile {
            liked_embedding: self.liked_embedding.clone(),
            disliked_embedding: self.disliked_embedding.clone(),
            liked_tours: self.liked_tours.clone(),
            disliked_tours: self.disliked_tours.clone(),
        }
    }

    pub fn apply_preferences(&mut self, profile: PreferenceProfile) {
        self.liked_embedding = profile.liked_embedding;
        self.disliked_embedding = profile.disliked_embedding;
        self.liked_tours = profile.liked_tours;
        self.disliked_tours = profile.disliked_tours;
        self.updated_at = Utc::now();
    }
}

/// The four preference fields, written together in one update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreferenceProfile {
    pub liked_embedding: Vec<f32>,
    pub disliked_embedding: Vec<f32>,
    pub liked_tours: Vec<i64>,
    pub disliked_tours: Vec<i64>,
}

/// Sign-up request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    #[validate(length(min = 3, max = 50))]
    pub user_name: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Sign-in request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignIn {
    #[validate(length(min = 1, max = 50))]
    pub user_name: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub jwt: String,
}

/// Profile returned by `/users/me`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub location: Option<Coordinate>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.user_name,
            first_name: user.first_name,
            last_name: user.last_name,
            location: user.location,
        }
    }
}

/// Stored location in the short form the map widget expects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationResponse {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinate> for LocationResponse {
    fn from(c: Coordinate) -> Self {
        Self {
            lat: c.latitude,
            lon: c.longitude,
        }
    }
}

/// Quiz answers: tour id -> liked, plus the embeddings the quiz returned.
///
/// Answers are applied in ascending tour id order.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct FeedbackRequest {
    pub answer: BTreeMap<i64, bool>,
    #[serde(default)]
    pub embeddings: HashMap<i64, Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackSummary {
    pub liked_tours: Vec<i64>,
    pub disliked_tours: Vec<i64>,
    /// Answers whose embedding was missing or malformed
    pub skipped: usize,
}
