use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Serialize;
use utoipa::ToSchema;

use super::QueryParams;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 50;

/// Highest page honored; keeps the row offset `(page - 1) * limit` within
/// the database's signed 64-bit range.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

/// Page-based pagination parameters (`?page=2&limit=20`).
///
/// `page` is 1-based; anything missing, unparsable or below 1 becomes 1,
/// and pages past [`MAX_PAGE`] are read as `MAX_PAGE` (always empty).
/// `limit` defaults to 10 and is silently clamped to 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn from_params(params: &QueryParams) -> Self {
        let page = params
            .get_count("page")
            .filter(|p| *p >= 1)
            .unwrap_or(1)
            .min(MAX_PAGE);
        let limit = params
            .get_count("limit")
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        PageRequest { page, limit }
    }

    /// Zero-based page index, as the store's paginator counts them.
    pub fn index(&self) -> u64 {
        self.page - 1
    }
}

impl<S> FromRequestParts<S> for PageRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PageRequest::from_params(&QueryParams::parse(
            parts.uri.query().unwrap_or(""),
        )))
    }
}

/// Pagination block returned alongside every listing.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u64,
}

impl PaginationMeta {
    pub fn new(request: PageRequest, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(request.limit);
        PaginationMeta {
            current_page: request.page,
            total_pages,
            total_count,
            has_next_page: request.page < total_pages,
            has_prev_page: request.page > 1,
            limit: request.limit,
        }
    }
}
