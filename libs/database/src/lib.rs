//! PostgreSQL connection management for the trek services.
//!
//! # Features
//!
//! - `postgres` (default) - SeaORM connector, migrations runner, health check
//! - `config` - `PostgresConfig: core_config::FromEnv`
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//!
//! let db = postgres::connect_from_config_with_retry(PostgresConfig::from_env()?, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "trek_api").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
