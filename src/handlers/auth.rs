use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::user;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{self, CurrentUser, MaybeUser, NewAccount};
use crate::error::ApiError;
use crate::extract::{ValidForm, ValidJson};
use crate::schemas::{AppState, ErrorResponse};

/// Request body for registering a user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Unique username, 3 to 50 characters
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    /// At least 6 characters
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub full_name: Option<String>,
}

/// Credentials, accepted as JSON or as an OAuth2 password form
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            user_id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

/// Issued access token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Token {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    pub user: UserResponse,
}

/// Result of a token check
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub username: Option<String>,
}

fn token_for(state: &AppState, user: user::Model) -> Result<Token, ApiError> {
    let access_token = state.auth.issue_token(&user.username)?;
    Ok(Token {
        access_token,
        token_type: "bearer".to_string(),
        user: UserResponse::from(user),
    })
}

/// Register a new user and log them in
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = Token),
        (status = 409, description = "Username or email already registered", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Valid(Json(request)), _): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Token>), ApiError> {
    trace!("Entering register function");

    let user = auth::register(
        &state.db,
        &state.auth,
        NewAccount {
            username: request.username,
            email: request.email,
            password: request.password,
            full_name: request.full_name,
        },
    )
    .await?;

    info!("User registered with ID: {}", user.id);
    Ok((StatusCode::CREATED, Json(token_for(&state, user)?)))
}

/// Log in with an OAuth2 password form
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in", body = Token),
        (status = 401, description = "Incorrect username or password", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Valid(Form(credentials)), _): ValidForm<LoginRequest>,
) -> Result<Json<Token>, ApiError> {
    trace!("Entering login function");
    let user = auth::authenticate(
        &state.db,
        &state.auth,
        &credentials.username,
        &credentials.password,
    )
    .await?;
    info!("User {} logged in", user.username);
    Ok(Json(token_for(&state, user)?))
}

/// Log in with a JSON body
#[utoipa::path(
    post,
    path = "/auth/login/json",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = Token),
        (status = 401, description = "Incorrect username or password", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn login_json(
    State(state): State<AppState>,
    WithRejection(Valid(Json(credentials)), _): ValidJson<LoginRequest>,
) -> Result<Json<Token>, ApiError> {
    trace!("Entering login_json function");
    let user = auth::authenticate(
        &state.db,
        &state.auth,
        &credentials.username,
        &credentials.password,
    )
    .await?;
    info!("User {} logged in", user.username);
    Ok(Json(token_for(&state, user)?))
}

/// Get the logged in user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Could not validate credentials", body = ErrorResponse)
    )
)]
#[instrument(skip(user))]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    debug!("Returning profile of user {}", user.id);
    Json(UserResponse::from(user))
}

/// Check whether the supplied token is valid
#[utoipa::path(
    get,
    path = "/auth/verify",
    tag = "auth",
    security((), ("bearer" = [])),
    responses(
        (status = 200, description = "Token status", body = VerifyResponse),
        (status = 503, description = "Database is unreachable", body = ErrorResponse)
    )
)]
#[instrument(skip(user))]
pub async fn verify(MaybeUser(user): MaybeUser) -> Json<VerifyResponse> {
    let response = match user {
        Some(user) => VerifyResponse {
            valid: true,
            username: Some(user.username),
        },
        None => VerifyResponse {
            valid: false,
            username: None,
        },
    };
    debug!("Token valid: {}", response.valid);
    Json(response)
}
