//! Client for the recommendation service.
//!
//! Every reply carries a `status` tag. `"success"` replies are decoded into
//! typed bodies here; `"error"` replies, non-2xx responses, transport errors
//! and malformed bodies all surface as [`DiscoveryError::Upstream`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::RecommenderConfig;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::{Candidate, QuizResponse, SketchRequest};
use domain_treks::TourRating;

/// Input for the preference quiz
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizQuery {
    pub liked_tours: Vec<i64>,
    pub disliked_tours: Vec<i64>,
    pub include_embeddings: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredEmbeddings {
    pub liked: Vec<f32>,
    pub disliked: Vec<f32>,
}

/// Input for personalized search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationQuery {
    pub user_id: String,
    pub user_query: String,
    pub stored_embeddings: StoredEmbeddings,
    pub tour_ratings: Vec<TourRating>,
    pub disliked_tour_indices: Vec<i64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Recommender: Send + Sync {
    /// Next quiz picks for the given rating history
    async fn quiz(&self, query: QuizQuery) -> DiscoveryResult<QuizResponse>;

    /// Treks whose photos match a drawing and/or caption
    async fn sketch(&self, request: SketchRequest) -> DiscoveryResult<Vec<Candidate>>;

    /// Personalized ranking from stored embeddings and past ratings
    async fn recommend(&self, query: RecommendationQuery) -> DiscoveryResult<Vec<Candidate>>;
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Reply<T> {
    Success(T),
    Error {
        #[serde(default)]
        message: String,
    },
}

/// Tour ids arrive as numbers or numeric strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTourId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawTourId {
    fn parse(&self) -> Option<i64> {
        match self {
            RawTourId::Int(id) => Some(*id),
            RawTourId::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            RawTourId::Float(_) => None,
            RawTourId::Text(s) => s.trim().parse().ok(),
        }
    }
}

// Map keys come back as strings once the tagged reply has been buffered
#[derive(Debug, Deserialize)]
struct QuizBody {
    #[serde(default)]
    recommendations: Vec<Value>,
    #[serde(default)]
    embeddings: HashMap<String, Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct SketchBody {
    results: Vec<SketchHit>,
}

#[derive(Debug, Deserialize)]
struct SketchHit {
    tour_id: RawTourId,
    #[serde(default)]
    url: String,
    #[serde(default)]
    similarity: f64,
}

#[derive(Debug, Deserialize)]
struct RecommendationsBody {
    data: RecommendationData,
}

#[derive(Debug, Deserialize)]
struct RecommendationData {
    recommendations: Vec<ScoredHit>,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ScoredHit {
    tour_id: RawTourId,
    #[serde(default)]
    similarity_score: f64,
}

fn parse_tour_id(raw: &RawTourId) -> Option<i64> {
    let id = raw.parse();
    if id.is_none() {
        warn!(tour_id = ?raw, "Dropping recommendation with unparsable tour id");
    }
    id
}

/// HTTP implementation of [`Recommender`]
pub struct HttpRecommender {
    client: Client,
    config: RecommenderConfig,
}

impl HttpRecommender {
    pub fn new(config: RecommenderConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> DiscoveryResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.config.base_url, path);
        debug!(%url, "Calling recommender");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .or_else(|| v.get("error"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            return Err(DiscoveryError::Upstream(format!(
                "Recommender {} returned {}: {}",
                path, status, detail
            )));
        }

        match serde_json::from_slice::<Reply<T>>(&bytes) {
            Ok(Reply::Success(body)) => Ok(body),
            Ok(Reply::Error { message }) => Err(DiscoveryError::Upstream(format!(
                "Recommender {} failed: {}",
                path, message
            ))),
            Err(e) => Err(DiscoveryError::Upstream(format!(
                "Malformed reply from recommender {}: {}",
                path, e
            ))),
        }
    }
}

#[async_trait]
impl Recommender for HttpRecommender {
    async fn quiz(&self, query: QuizQuery) -> DiscoveryResult<QuizResponse> {
        let body: QuizBody = self.post("quiz", &query).await?;

        let embeddings = body
            .embeddings
            .into_iter()
            .filter_map(|(key, embedding)| match key.trim().parse::<i64>() {
                Ok(id) => Some((id, embedding)),
                Err(_) => {
                    warn!(tour_id = %key, "Dropping quiz embedding with unparsable tour id");
                    None
                }
            })
            .collect();

        Ok(QuizResponse {
            recommendations: body.recommendations,
            embeddings,
        })
    }

    async fn sketch(&self, request: SketchRequest) -> DiscoveryResult<Vec<Candidate>> {
        let body: SketchBody = self.post("Sketch2ImageRetriever", &request).await?;

        Ok(body
            .results
            .into_iter()
            .filter_map(|hit| {
                let id = parse_tour_id(&hit.tour_id)?;
                let candidate = Candidate::new(id, hit.similarity);
                Some(if hit.url.is_empty() {
                    candidate
                } else {
                    candidate.with_image(hit.url)
                })
            })
            .collect())
    }

    async fn recommend(&self, query: RecommendationQuery) -> DiscoveryResult<Vec<Candidate>> {
        let body: RecommendationsBody = self.post("recommendations", &query).await?;

        if let Some(metadata) = &body.data.metadata {
            debug!(?metadata, "Recommendation metadata");
        }

        Ok(body
            .data
            .recommendations
            .into_iter()
            .filter_map(|hit| {
                parse_tour_id(&hit.tour_id).map(|id| Candidate::new(id, hit.similarity_score))
            })
            .collect())
    }
}
