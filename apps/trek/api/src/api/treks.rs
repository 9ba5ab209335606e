use axum::Router;
use domain_treks::{PgTrekRepository, TrekService, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let service = TrekService::new(PgTrekRepository::new(state.db.clone()));
    handlers::router(service, state.jwt.clone())
}
