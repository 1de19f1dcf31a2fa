use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Router, extract::State};
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{create_token, hash_password, verify_password};
use crate::error::ApiError;
use crate::extractors::{AuthUser, JsonBody};
use crate::models::UserResponse;
use crate::repository::users;
use crate::response::ApiResponse;
use crate::validation::{login_input, registration_input};

use super::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const EMAIL_TAKEN: &str = "User with this email already exists";

// ── Request / Response types ──

/// Registration payload. `name` is optional.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserResponse,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

// ── Handlers ──

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, ApiResponse<AuthResponse>), ApiError> {
    let input = registration_input(&body)?;

    if users::find_by_email(&state.db, &input.email).await?.is_some() {
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&input.password)?;
    // A concurrent registration can still win the race to the unique index.
    let user = users::create(&state.db, input.email, input.name, password_hash)
        .await
        .map_err(email_conflict)?;
    let token = create_token(&user.id, &state.config.jwt_secret, state.config.jwt_expiry_hours)?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(AuthResponse {
            token,
            user: user.into(),
        })
        .with_message("User registered successfully"),
    ))
}

/// Maps a unique-index violation on insert to `409 Conflict`.
pub(crate) fn email_conflict(err: DbErr) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::Conflict(EMAIL_TAKEN.to_string()),
        _ => ApiError::Database(err),
    }
}

/// Exchange credentials for a token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<AuthResponse>, ApiError> {
    let input = login_input(&body)?;

    let user = users::find_by_email(&state.db, &input.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&input.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "login rejected");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = create_token(&user.id, &state.config.jwt_secret, state.config.jwt_expiry_hours)?;

    Ok(ApiResponse::success(AuthResponse {
        token,
        user: user.into(),
    })
    .with_message("Login successful"))
}

/// The authenticated caller's account.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<MeResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<MeResponse>, ApiError> {
    let user = users::find_by_id(&state.db, &user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(ApiResponse::success(MeResponse { user: user.into() }))
}
