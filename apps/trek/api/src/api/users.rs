use axum::Router;
use domain_users::{PgUserRepository, UserService, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgUserRepository::new(state.db.clone());
    let service = UserService::with_embedding_dim(repository, state.config.embedding_dim);
    handlers::router(service, state.jwt.clone())
}
