use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use super::PostgresConfig;
use crate::common::{DatabaseResult, RetryConfig, retry, retry_with_backoff};

/// Connect with the configured pool, retrying with exponential backoff.
///
/// `None` uses [`RetryConfig::default`].
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    let options = config.into_connect_options();
    let attempt = || {
        let opts = options.clone();
        async move { Database::connect(opts).await }
    };

    let db = match retry_config {
        Some(config) => retry_with_backoff(attempt, config).await?,
        None => retry(attempt).await?,
    };

    info!("Successfully connected to PostgreSQL database");
    Ok(db)
}

/// Apply all pending migrations of `M`.
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> DatabaseResult<()> {
    info!("Running {} database migrations...", app_name);
    M::up(db, None).await?;
    info!("Migrations completed successfully for {}", app_name);
    Ok(())
}

/// Close the pool, logging the outcome. Used during graceful shutdown.
pub async fn close(db: DatabaseConnection) {
    match db.close().await {
        Ok(()) => info!("PostgreSQL connection closed"),
        Err(e) => error!("Error closing PostgreSQL connection: {}", e),
    }
}
