use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    JwtAuth, JwtClaims, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::TrekResult;
use crate::models::{CoverImage, CreateComment, Trek, TrekComment, TrekDetail, TrekImage};
use crate::repository::TrekRepository;
use crate::service::TrekService;

pub const TAG: &str = "treks";

/// OpenAPI documentation for the treks API
#[derive(OpenApi)]
#[openapi(
    paths(get_trek, add_comment),
    components(
        schemas(Trek, TrekImage, CoverImage, TrekComment, TrekDetail, CreateComment),
        responses(
            BadRequestValidationResponse,
            NotFoundResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "Trek catalog and comments"))
)]
pub struct ApiDoc;

/// Create the treks router; every route requires a bearer token
pub fn router<R: TrekRepository + 'static>(service: TrekService<R>, jwt: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/{id}", get(get_trek))
        .route("/{id}/comments", post(add_comment))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .with_state(shared_service)
}

/// Trek detail with comments
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = i64, Path, description = "Tour ID")),
    responses(
        (status = 200, description = "Trek found", body = TrekDetail),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_trek<R: TrekRepository>(
    State(service): State<Arc<TrekService<R>>>,
    Path(id): Path<i64>,
) -> TrekResult<Json<TrekDetail>> {
    let detail = service.get_detail(id).await?;
    Ok(Json(detail))
}

/// Rate or comment on a trek
#[utoipa::path(
    post,
    path = "/{id}/comments",
    tag = TAG,
    params(("id" = i64, Path, description = "Tour ID")),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment created", body = TrekComment),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_comment<R: TrekRepository>(
    State(service): State<Arc<TrekService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<CreateComment>,
) -> TrekResult<impl IntoResponse> {
    let comment = service.add_comment(claims.sub, id, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
