use std::convert::Infallible;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth;
use crate::config::Config;
use crate::error::ApiError;

/// Extractor that validates the bearer token and provides the authenticated user ID.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn my_handler(AuthUser(user_id): AuthUser) -> impl IntoResponse {
///     // user_id is the authenticated user's ID
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_user_id(parts).map(AuthUser)
    }
}

/// Like [`AuthUser`], but a missing or invalid token yields an anonymous caller
/// instead of a rejection.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<String>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(bearer_user_id(parts).ok()))
    }
}

fn bearer_user_id(parts: &Parts) -> Result<String, ApiError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

    // Expect "Bearer <token>"
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized("Invalid Authorization header format".to_string())
    })?;

    // JWT secret lives in the Arc<Config> request extension.
    let config = parts
        .extensions
        .get::<Arc<Config>>()
        .ok_or_else(|| ApiError::Internal("Config not found in request".to_string()))?;

    let claims = auth::validate_token(token.trim(), &config.jwt_secret)?;

    crate::ids::parse(&claims.sub)
        .ok_or_else(|| ApiError::Unauthorized("Invalid user ID in token".to_string()))
}
