use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrekImage {
    pub url: String,
}

/// Hand-picked cover image with its aesthetic score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoverImage {
    pub url: String,
    #[serde(default)]
    pub score: f64,
}

/// Catalog entry. Read-only from the API's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Trek {
    /// Shared with the recommendation service
    pub tour_id: i64,
    pub title: String,
    pub route_type: String,
    pub difficulty: Option<String>,
    pub short_description: String,
    pub long_description: String,
    pub images: Vec<TrekImage>,
    pub cover_image: Option<CoverImage>,
    /// Free-form facts; `duration.value` holds the walking time in minutes
    #[schema(value_type = Object)]
    pub amenities: Value,
    pub tags: Vec<String>,
    pub best_months: Vec<String>,
    pub url: String,
    pub map_url: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Trek {
    /// Walking time in minutes from `amenities.duration.value`, when positive.
    pub fn duration_minutes(&self) -> Option<u64> {
        let value = self.amenities.get("duration")?.get("value")?;
        let minutes = value
            .as_u64()
            .or_else(|| value.as_f64().filter(|m| *m > 0.0).map(|m| m.round() as u64))?;
        (minutes > 0).then_some(minutes)
    }
}

/// A user's rating and comment on a trek
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrekComment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub trek_id: i64,
    pub rating: Option<f64>,
    pub text: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TrekComment {
    pub fn new(user_id: Uuid, trek_id: i64, input: CreateComment) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            trek_id,
            rating: input.rating,
            text: input.text,
            images: input.images,
            created_at: Utc::now(),
        }
    }
}

/// New comment payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub text: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub images: Vec<String>,
}

/// Trek with its comments, newest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrekDetail {
    #[serde(flatten)]
    pub trek: Trek,
    pub comments: Vec<TrekComment>,
}

/// A past rating fed to personalized search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TourRating {
    pub tour_id: i64,
    pub rating: f64,
}
