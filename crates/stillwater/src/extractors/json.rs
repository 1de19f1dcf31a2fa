use axum::extract::{FromRequest, Request};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Raw JSON object body.
///
/// Request payloads are validated field by field before they are turned
/// into typed values (see [`crate::validation`]), so this extractor only
/// enforces the structure: a body must be present and be a JSON object.
///
/// ```rust,ignore
/// async fn create(JsonBody(body): JsonBody) -> Result<..., ApiError> {
///     let input = validation::session_input(&body)?;
/// }
/// ```
pub struct JsonBody(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read body: {}", e)))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::BadRequest("Request body is required".to_string()));
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))?;

        match value {
            Value::Object(map) => Ok(JsonBody(map)),
            _ => Err(ApiError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }
}

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn extract(body: &'static str) -> Result<JsonBody, ApiError> {
        let req = axum::http::Request::builder().body(Body::from(body)).unwrap();
        JsonBody::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_object_body_accepted() {
        let body = extract(r#"{"title":"Breathing"}"#).await.unwrap();
        assert_eq!(body.0["title"], "Breathing");
    }

    #[tokio::test]
    async fn test_structural_failures() {
        assert!(matches!(extract("").await, Err(ApiError::BadRequest(_))));
        assert!(matches!(extract("not json").await, Err(ApiError::BadRequest(_))));
        assert!(matches!(extract("[1,2]").await, Err(ApiError::BadRequest(_))));
        assert!(matches!(extract("\"title\"").await, Err(ApiError::BadRequest(_))));
    }
}
