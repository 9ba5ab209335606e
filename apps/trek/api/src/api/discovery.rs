use axum::Router;
use domain_discovery::{DiscoveryClients, DiscoveryService, handlers};
use domain_treks::{PgTrekRepository, TrekService};
use domain_users::{PgUserRepository, UserService};

pub fn router(state: &crate::state::AppState) -> Router {
    let users = UserService::with_embedding_dim(
        PgUserRepository::new(state.db.clone()),
        state.config.embedding_dim,
    );
    let treks = TrekService::new(PgTrekRepository::new(state.db.clone()));
    let clients = DiscoveryClients {
        recommender: state.recommender.clone(),
        distance_matrix: state.maps.clone(),
        geocoder: state.maps.clone(),
    };

    let service = DiscoveryService::new(
        users,
        treks,
        clients,
        state.config.discovery.blocklist.clone(),
    );
    handlers::router(service, state.jwt.clone())
}
