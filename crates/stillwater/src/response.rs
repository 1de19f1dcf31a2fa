use serde::Serialize;
use utoipa::ToSchema;

/// Standard API response wrapper.
///
/// Every endpoint returns this shape:
/// ```json
/// {
///   "success": true,
///   "message": "Session published successfully",
///   "data": { ... }
/// }
/// ```
///
/// Failures set `success: false`, a human-readable `message`, a stable
/// `code`, and for validation failures the ordered `errors` list.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Internal error detail, only present outside production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response with data.
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            message: None,
            code: None,
            data: Some(data),
            errors: None,
            error: None,
        }
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Create a failure response.
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            message: Some(message.into()),
            code: Some(code.into()),
            data: None,
            errors: None,
            error: None,
        }
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = if self.success {
            axum::http::StatusCode::OK
        } else {
            axum::http::StatusCode::BAD_REQUEST
        };
        (status, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_empty_fields() {
        let body = ApiResponse::success(serde_json::json!({"id": 1})).with_message("ok");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "ok");
        assert_eq!(json["data"]["id"], 1);
        assert!(json.get("errors").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("code").is_none());
    }

    #[test]
    fn test_failure_envelope() {
        let body = ApiResponse::failure("NOT_FOUND", "Session not found");
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Session not found");
        assert!(json.get("data").is_none());
    }
}
