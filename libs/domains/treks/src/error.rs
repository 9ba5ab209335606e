use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrekError {
    #[error("Trek not found: {0}")]
    NotFound(i64),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TrekResult<T> = Result<T, TrekError>;

impl From<TrekError> for AppError {
    fn from(err: TrekError) -> Self {
        match err {
            TrekError::NotFound(id) => AppError::NotFound(format!("Trek {} not found", id)),
            TrekError::Validation(msg) => AppError::BadRequest(msg),
            TrekError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<sea_orm::DbErr> for TrekError {
    fn from(err: sea_orm::DbErr) -> Self {
        TrekError::Internal(format!("Database error: {}", err))
    }
}

impl IntoResponse for TrekError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
