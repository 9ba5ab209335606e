//! Treks Domain
//!
//! The read-only trek catalog shared with the recommendation service, plus
//! user comments and ratings.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{TrekError, TrekResult};
pub use handlers::ApiDoc;
pub use models::{CoverImage, CreateComment, TourRating, Trek, TrekComment, TrekDetail, TrekImage};
pub use postgres::PgTrekRepository;
pub use repository::{InMemoryTrekRepository, TrekRepository};
pub use service::TrekService;

#[cfg(any(test, feature = "mock"))]
pub use repository::MockTrekRepository;
