//! Discovery Domain
//!
//! Quiz, sketch search and personalized search backed by the external
//! recommendation service, with results enriched from the trek catalog and
//! the maps API. Also owns the user's location flows (geocoding).

pub mod config;
pub mod enrichment;
pub mod error;
pub mod handlers;
pub mod maps;
pub mod models;
pub mod recommender;
pub mod service;

pub use config::{DiscoveryConfig, ImageBlocklist, MapsConfig, RecommenderConfig};
pub use enrichment::{SENTINEL_DISTANCE_METERS, SENTINEL_TRAVEL_SECONDS, enrich};
pub use error::{DiscoveryError, DiscoveryResult};
pub use handlers::ApiDoc;
pub use maps::{DistanceMatrix, Geocoder, GoogleMapsClient, MAX_DESTINATIONS, MatrixElement};
pub use models::{Candidate, DiscoveryResponse, EnrichedTrek, FilterMetadata};
pub use recommender::{HttpRecommender, Recommender};
pub use service::{DiscoveryClients, DiscoveryService};
