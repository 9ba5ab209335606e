//! Shared application state.
//!
//! Built once at start-up; domain routers take what they need from it.

use axum_helpers::JwtAuth;
use domain_discovery::{GoogleMapsClient, HttpRecommender};
use std::sync::Arc;

/// Cloned into each router (Arc and pool handles only)
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    pub jwt: JwtAuth,
    pub recommender: Arc<HttpRecommender>,
    /// Serves both distance matrix and geocoding
    pub maps: Arc<GoogleMapsClient>,
}
