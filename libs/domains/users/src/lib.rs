//! Users Domain
//!
//! Accounts, sign-in, stored location and the preference embeddings that
//! personalize trek recommendations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (/auth, /users/me)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Password hashing, feedback → embedding update
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory / Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("a-development-secret-of-32-chars!"));
//! let service = UserService::new(InMemoryUserRepository::new());
//!
//! let auth_routes = handlers::auth_router(service.clone(), jwt.clone());
//! let user_routes = handlers::router(service, jwt);
//! ```

pub mod embedding;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use embedding::{DECAY, HISTORY_CAP, normalize};
pub use error::{UserError, UserResult};
pub use handlers::{ApiDoc, AuthApiDoc};
pub use models::{
    Coordinate, FeedbackRequest, FeedbackSummary, LocationResponse, PreferenceProfile, SignIn,
    SignUp, TokenResponse, User, UserProfile,
};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{DEFAULT_EMBEDDING_DIM, UserService};

#[cfg(any(test, feature = "mock"))]
pub use repository::MockUserRepository;
