use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_treks::TrekError;
use domain_users::UserError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("User location is not set")]
    LocationNotSet,

    #[error("Could not resolve location '{0}'")]
    LocationUnresolved(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

impl From<DiscoveryError> for AppError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::LocationNotSet => {
                AppError::PreconditionFailed("User location is not set".to_string())
            }
            DiscoveryError::LocationUnresolved(name) => {
                AppError::BadRequest(format!("Could not resolve location '{}'", name))
            }
            DiscoveryError::NotFound(msg) => AppError::NotFound(msg),
            DiscoveryError::Validation(msg) => AppError::BadRequest(msg),
            DiscoveryError::Upstream(msg) => AppError::BadGateway(msg),
            DiscoveryError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<UserError> for DiscoveryError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => DiscoveryError::NotFound(format!("User {} not found", id)),
            UserError::LocationNotSet => DiscoveryError::LocationNotSet,
            UserError::Validation(msg) => DiscoveryError::Validation(msg),
            other => DiscoveryError::Internal(other.to_string()),
        }
    }
}

impl From<TrekError> for DiscoveryError {
    fn from(err: TrekError) -> Self {
        match err {
            TrekError::NotFound(id) => DiscoveryError::NotFound(format!("Trek {} not found", id)),
            TrekError::Validation(msg) => DiscoveryError::Validation(msg),
            TrekError::Internal(msg) => DiscoveryError::Internal(msg),
        }
    }
}

// The request URL can carry credentials in its query string, so it never
// reaches the message.
impl From<reqwest::Error> for DiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        DiscoveryError::Upstream(err.without_url().to_string())
    }
}

impl IntoResponse for DiscoveryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
