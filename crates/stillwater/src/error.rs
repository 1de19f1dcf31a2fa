use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::response::ApiResponse;

/// Error type shared by every handler, extractor and repository call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-bounds input; carries every field error, in order.
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// The request body is structurally unusable (absent, not JSON, not an object).
    #[error("{0}")]
    BadRequest(String),

    /// A status-dependent rule was violated, e.g. publishing without content.
    #[error("{0}")]
    BusinessRule(String),

    #[error("{0}")]
    Unauthorized(String),

    /// The record exists but the caller may not touch it.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Detail of a 500 response, attached to the response extensions.
///
/// The body never carries it; [`expose_internal_errors`](crate::app::expose_internal_errors)
/// copies it into the envelope when the app is not running in production.
#[derive(Debug, Clone)]
pub struct InternalErrorReport {
    pub message: String,
    pub code: &'static str,
    pub detail: String,
}

impl ApiError {
    /// Build a validation error from a single message.
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::Validation(vec![message.into()])
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BusinessRule(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "ACCESS_DENIED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Database(_) => "DATABASE_ERROR",
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, ApiError::Internal(_) | ApiError::Database(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_internal() {
            let detail = self.to_string();
            tracing::error!(code, error = %detail, "request failed");
            let message = "Internal server error".to_string();
            let mut response =
                (status, axum::Json(ApiResponse::failure(code, message.clone()))).into_response();
            response.extensions_mut().insert(InternalErrorReport {
                message,
                code,
                detail,
            });
            return response;
        }

        let mut body = ApiResponse::failure(code, self.to_string());
        if let ApiError::Validation(errors) = self {
            body.errors = Some(errors);
        }
        (status, axum::Json(body)).into_response()
    }
}
