use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware,
    routing::{get, post},
};
use axum_helpers::{
    JwtAuth, JwtClaims, ValidatedJson,
    errors::responses::{
        BadGatewayResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        LocationNotSetResponse, NotFoundResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use domain_treks::TrekRepository;
use domain_users::UserRepository;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::DiscoveryResult;
use crate::models::{
    AddressResponse, Destination, DiscoveryResponse, DistanceRequest, DistanceResponse,
    DistanceResult, EnrichedTrek, FilterMetadata, FindQuery, LatLng, LocationUpdate,
    LocationUpdated, Measure, QuizResponse, SketchRequest,
};
use crate::service::DiscoveryService;

pub const TAG: &str = "discovery";

/// OpenAPI documentation for the discovery API
#[derive(OpenApi)]
#[openapi(
    paths(update_location, get_address, quiz, sketch, find, distance),
    components(
        schemas(
            LatLng,
            LocationUpdate,
            LocationUpdated,
            AddressResponse,
            QuizResponse,
            SketchRequest,
            EnrichedTrek,
            FilterMetadata,
            DiscoveryResponse,
            Destination,
            DistanceRequest,
            Measure,
            DistanceResult,
            DistanceResponse
        ),
        responses(
            BadRequestValidationResponse,
            LocationNotSetResponse,
            NotFoundResponse,
            UnauthorizedResponse,
            BadGatewayResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "Recommendations, distances and location"))
)]
pub struct ApiDoc;

type SharedService<U, T> = Arc<DiscoveryService<U, T>>;

/// Create the discovery router; every route requires a bearer token
pub fn router<U, T>(service: DiscoveryService<U, T>, jwt: JwtAuth) -> Router
where
    U: UserRepository + 'static,
    T: TrekRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/location", post(update_location))
        .route("/location/address", get(get_address))
        .route("/quiz", post(quiz))
        .route("/sketch", post(sketch))
        .route("/find", get(find))
        .route("/distance", post(distance))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .with_state(shared_service)
}

/// Set the user's location from a place name or coordinates
#[utoipa::path(
    post,
    path = "/location",
    tag = TAG,
    request_body = LocationUpdate,
    responses(
        (status = 200, description = "Location stored", body = LocationUpdated),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 502, response = BadGatewayResponse)
    )
)]
async fn update_location<U: UserRepository, T: TrekRepository>(
    State(service): State<SharedService<U, T>>,
    Extension(claims): Extension<JwtClaims>,
    ValidatedJson(update): ValidatedJson<LocationUpdate>,
) -> DiscoveryResult<Json<LocationUpdated>> {
    let updated = service.update_location(claims.sub, update).await?;
    Ok(Json(updated))
}

/// Human-readable address of the stored location
#[utoipa::path(
    get,
    path = "/location/address",
    tag = TAG,
    responses(
        (status = 200, description = "Address", body = AddressResponse),
        (status = 400, response = LocationNotSetResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 502, response = BadGatewayResponse)
    )
)]
async fn get_address<U: UserRepository, T: TrekRepository>(
    State(service): State<SharedService<U, T>>,
    Extension(claims): Extension<JwtClaims>,
) -> DiscoveryResult<Json<AddressResponse>> {
    let address = service.address(claims.sub).await?;
    Ok(Json(address))
}

/// Next preference-quiz picks
#[utoipa::path(
    post,
    path = "/quiz",
    tag = TAG,
    responses(
        (status = 200, description = "Quiz picks with embeddings", body = QuizResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 502, response = BadGatewayResponse)
    )
)]
async fn quiz<U: UserRepository, T: TrekRepository>(
    State(service): State<SharedService<U, T>>,
    Extension(claims): Extension<JwtClaims>,
) -> DiscoveryResult<Json<QuizResponse>> {
    let response = service.quiz(claims.sub).await?;
    Ok(Json(response))
}

/// Search treks by drawing and/or caption
#[utoipa::path(
    post,
    path = "/sketch",
    tag = TAG,
    request_body = SketchRequest,
    responses(
        (status = 200, description = "Enriched results", body = DiscoveryResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 502, response = BadGatewayResponse)
    )
)]
async fn sketch<U: UserRepository, T: TrekRepository>(
    State(service): State<SharedService<U, T>>,
    Extension(claims): Extension<JwtClaims>,
    ValidatedJson(request): ValidatedJson<SketchRequest>,
) -> DiscoveryResult<Json<DiscoveryResponse>> {
    let response = service.sketch(claims.sub, request).await?;
    Ok(Json(response))
}

/// Personalized recommendations
#[utoipa::path(
    get,
    path = "/find",
    tag = TAG,
    params(FindQuery),
    responses(
        (status = 200, description = "Enriched results", body = DiscoveryResponse),
        (status = 400, response = LocationNotSetResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 502, response = BadGatewayResponse)
    )
)]
async fn find<U: UserRepository, T: TrekRepository>(
    State(service): State<SharedService<U, T>>,
    Extension(claims): Extension<JwtClaims>,
    Query(query): Query<FindQuery>,
) -> DiscoveryResult<Json<DiscoveryResponse>> {
    let response = service.find(claims.sub, query).await?;
    Ok(Json(response))
}

/// Travel distance and time to up to 25 destinations
#[utoipa::path(
    post,
    path = "/distance",
    tag = TAG,
    request_body = DistanceRequest,
    responses(
        (status = 200, description = "Distance matrix row", body = DistanceResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 502, response = BadGatewayResponse)
    )
)]
async fn distance<U: UserRepository, T: TrekRepository>(
    State(service): State<SharedService<U, T>>,
    Extension(claims): Extension<JwtClaims>,
    ValidatedJson(request): ValidatedJson<DistanceRequest>,
) -> DiscoveryResult<Json<DistanceResponse>> {
    let response = service.distance(claims.sub, request).await?;
    Ok(Json(response))
}
