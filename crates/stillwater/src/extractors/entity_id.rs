use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::ids;

/// `{id}` path parameter that has already been checked against the
/// identifier format and normalized to lowercase.
///
/// Place it before [`AuthUser`](super::AuthUser) in a handler's arguments so a
/// malformed id is rejected before anything else runs.
#[derive(Debug, Clone)]
pub struct EntityId(pub String);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::invalid("Invalid id format"))?;

        ids::parse(&raw)
            .map(EntityId)
            .ok_or_else(|| ApiError::invalid("Invalid id format"))
    }
}
