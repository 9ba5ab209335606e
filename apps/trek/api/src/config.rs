use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, env_parse, env_required, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_discovery::DiscoveryConfig;
use domain_users::DEFAULT_EMBEDDING_DIM;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub jwt: JwtConfig,
    /// Comma-separated list for the CORS layer
    pub cors_allowed_origin: String,
    pub discovery: DiscoveryConfig,
    pub embedding_dim: usize,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080
        let database = PostgresConfig::from_env()?; // DATABASE_URL required
        let jwt = JwtConfig::from_env()?;
        let cors_allowed_origin = env_required("CORS_ALLOWED_ORIGIN")?;
        let discovery = DiscoveryConfig::from_env()?;

        let embedding_dim: usize = env_parse("EMBEDDING_DIM", &DEFAULT_EMBEDDING_DIM.to_string())?;
        if embedding_dim == 0 {
            eyre::bail!("EMBEDDING_DIM must be positive");
        }

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            database,
            jwt,
            cors_allowed_origin,
            discovery,
            embedding_dim,
            run_migrations: env_parse("RUN_MIGRATIONS", "true")?,
        })
    }
}
