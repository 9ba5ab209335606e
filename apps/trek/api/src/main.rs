use axum_helpers::JwtAuth;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_discovery::{GoogleMapsClient, HttpRecommender};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name).await?;
    }

    let recommender = HttpRecommender::new(config.discovery.recommender.clone())
        .map_err(|e| eyre::eyre!("Failed to build recommender client: {}", e))?;
    let maps = GoogleMapsClient::new(config.discovery.maps.clone())
        .map_err(|e| eyre::eyre!("Failed to build maps client: {}", e))?;
    info!(
        recommender = %config.discovery.recommender.base_url,
        embedding_dim = config.embedding_dim,
        "External clients ready"
    );

    let state = AppState {
        jwt: JwtAuth::new(&config.jwt),
        config,
        db,
        recommender: Arc::new(recommender),
        maps: Arc::new(maps),
    };

    let api_routes = api::routes(&state);
    let router =
        axum_helpers::create_router::<openapi::ApiDoc>(api_routes, &state.config.cors_allowed_origin)?;

    // /health: liveness with name/version; /ready: database check
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!("Starting trek API (30s graceful shutdown)");

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        info!("Shutting down: closing database connections");
        database::postgres::close(state.db).await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Trek API shutdown complete");
    Ok(())
}
