use axum::{
    Extension, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, JwtAuth, JwtClaims, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        LocationNotSetResponse, NotFoundResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, extract_user_agent, jwt_auth_middleware,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{
    Coordinate, FeedbackRequest, FeedbackSummary, LocationResponse, SignIn, SignUp, TokenResponse,
    User, UserProfile,
};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const AUTH_TAG: &str = "auth";
pub const USERS_TAG: &str = "users";

/// OpenAPI documentation for the sign-up/sign-in endpoints
#[derive(OpenApi)]
#[openapi(
    paths(sign_up, sign_in),
    components(
        schemas(SignUp, SignIn, TokenResponse),
        responses(
            BadRequestValidationResponse,
            ConflictResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = AUTH_TAG, description = "Account registration and sign-in"))
)]
pub struct AuthApiDoc;

/// OpenAPI documentation for the current-user endpoints
#[derive(OpenApi)]
#[openapi(
    paths(get_me, get_location, submit_feedback),
    components(
        schemas(UserProfile, Coordinate, LocationResponse, FeedbackRequest, FeedbackSummary),
        responses(
            LocationNotSetResponse,
            NotFoundResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = USERS_TAG, description = "Current user profile and preferences"))
)]
pub struct ApiDoc;

pub struct UsersState<R: UserRepository> {
    service: Arc<UserService<R>>,
    jwt: JwtAuth,
}

impl<R: UserRepository> Clone for UsersState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            jwt: self.jwt.clone(),
        }
    }
}

/// Public `/auth` routes issuing tokens
pub fn auth_router<R: UserRepository + 'static>(service: UserService<R>, jwt: JwtAuth) -> Router {
    let state = UsersState {
        service: Arc::new(service),
        jwt,
    };

    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .with_state(state)
}

/// `/users` routes, all behind the JWT middleware
pub fn router<R: UserRepository + 'static>(service: UserService<R>, jwt: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/me", get(get_me))
        .route("/me/location", get(get_location))
        .route("/me/feedback", post(submit_feedback))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .with_state(shared_service)
}

fn issue_token(jwt: &JwtAuth, user: &User) -> UserResult<TokenResponse> {
    let token = jwt
        .create_token(user.id, &user.user_name)
        .map_err(|e| UserError::Internal(format!("Failed to issue token: {}", e)))?;
    Ok(TokenResponse { jwt: token })
}

/// Create an account and return a session token
#[utoipa::path(
    post,
    path = "/signup",
    tag = AUTH_TAG,
    request_body = SignUp,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn sign_up<R: UserRepository>(
    State(state): State<UsersState<R>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<SignUp>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.sign_up(input).await?;
    let token = issue_token(&state.jwt, &user)?;

    AuditEvent::new(Some(user.id), "user.signup", AuditOutcome::Success)
        .with_ip(extract_ip_from_headers(&headers))
        .with_user_agent(extract_user_agent(&headers))
        .with_details(json!({ "user_name": user.user_name }))
        .log();

    Ok((StatusCode::CREATED, Json(token)))
}

/// Verify credentials and return a session token
#[utoipa::path(
    post,
    path = "/signin",
    tag = AUTH_TAG,
    request_body = SignIn,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn sign_in<R: UserRepository>(
    State(state): State<UsersState<R>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<SignIn>,
) -> UserResult<Json<TokenResponse>> {
    let user_name = input.user_name.clone();

    let user = match state.service.sign_in(input).await {
        Ok(user) => user,
        Err(err) => {
            if matches!(err, UserError::InvalidCredentials) {
                AuditEvent::new(None, "user.signin", AuditOutcome::Denied)
                    .with_ip(extract_ip_from_headers(&headers))
                    .with_user_agent(extract_user_agent(&headers))
                    .with_details(json!({ "user_name": user_name }))
                    .log();
            }
            return Err(err);
        }
    };

    let token = issue_token(&state.jwt, &user)?;

    AuditEvent::new(Some(user.id), "user.signin", AuditOutcome::Success)
        .with_ip(extract_ip_from_headers(&headers))
        .with_user_agent(extract_user_agent(&headers))
        .log();

    Ok(Json(token))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/me",
    tag = USERS_TAG,
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_me<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(claims): Extension<JwtClaims>,
) -> UserResult<Json<UserProfile>> {
    let user = service.get_user(claims.sub).await?;
    Ok(Json(user.into()))
}

/// Current user's stored location
#[utoipa::path(
    get,
    path = "/me/location",
    tag = USERS_TAG,
    responses(
        (status = 200, description = "Stored location", body = LocationResponse),
        (status = 400, response = LocationNotSetResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_location<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(claims): Extension<JwtClaims>,
) -> UserResult<Json<LocationResponse>> {
    let location = service.get_location(claims.sub).await?;
    Ok(Json(location.into()))
}

/// Record quiz answers and update the preference embeddings
#[utoipa::path(
    post,
    path = "/me/feedback",
    tag = USERS_TAG,
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Preferences updated", body = FeedbackSummary),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn submit_feedback<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<FeedbackRequest>,
) -> UserResult<Json<FeedbackSummary>> {
    let rated = request.answer.len();
    let summary = service.submit_feedback(claims.sub, request).await?;

    AuditEvent::new(Some(claims.sub), "user.feedback", AuditOutcome::Success)
        .with_ip(extract_ip_from_headers(&headers))
        .with_details(json!({ "rated": rated, "skipped": summary.skipped }))
        .log();

    Ok(Json(summary))
}
