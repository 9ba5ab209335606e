use axum::Router;

pub mod auth;
pub mod discovery;
pub mod health;
pub mod treks;
pub mod users;

/// API routes without the `/api` prefix; `create_router` adds it.
///
/// Each sub-router has its state applied, so the result is stateless.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new()
        .nest("/auth", auth::router(state))
        .nest("/users", users::router(state))
        .nest("/treks", treks::router(state))
        .nest("/discovery", discovery::router(state))
}

/// `/ready` with a live database check
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
