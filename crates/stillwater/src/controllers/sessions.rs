//! Public read surface: listing, search, tag statistics and single fetch.

use axum::routing::get;
use axum::{Router, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::extractors::{EntityId, MaybeAuthUser, PageRequest, PaginationMeta, QueryParams};
use crate::lifecycle::{self, Viewer};
use crate::models::{SessionRecord, SessionResponse};
use crate::repository::{
    Scope, SessionFilter, Sort, SortField, SortOrder, TagCount, sessions, users,
};
use crate::response::ApiResponse;

use super::AppState;

const DEFAULT_TAG_LIMIT: u64 = 50;

// ── Response types ──

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionList {
    pub sessions: Vec<SessionResponse>,
    pub pagination: PaginationMeta,
}

/// The effective search, echoed back to the caller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: Option<String>,
    pub tags: Vec<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub sessions: Vec<SessionResponse>,
    pub pagination: PaginationMeta,
    pub search_query: SearchQuery,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagList {
    pub tags: Vec<TagCount>,
    pub total_unique_tags: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub session: SessionResponse,
    pub is_owner: bool,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions))
        .route("/search", get(search_sessions))
        .route("/tags", get(popular_tags))
        .route("/{id}", get(get_session))
}

// ── Handlers ──

/// Published sessions, newest first.
#[utoipa::path(
    get,
    path = "/api/sessions",
    params(
        ("page" = Option<u64>, Query, description = "1-based page"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 50"),
        ("search" = Option<String>, Query, description = "Substring of title or content"),
        ("tags" = Option<String>, Query, description = "Comma-separated tags")
    ),
    responses(
        (status = 200, description = "Published sessions", body = ApiResponse<SessionList>)
    ),
    tag = "sessions"
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<ApiResponse<SessionList>, ApiError> {
    let page = PageRequest::from_params(&params);
    let filter = SessionFilter {
        search: params.get("search").map(str::to_string),
        tags: params.list("tags"),
        ..SessionFilter::new(Scope::Published)
    };

    let (records, total) = sessions::list(&state.db, &filter, Sort::NEWEST_CREATED, page).await?;

    Ok(ApiResponse::success(SessionList {
        sessions: with_owner_emails(&state, records).await?,
        pagination: PaginationMeta::new(page, total),
    }))
}

/// Published sessions with explicit sorting.
#[utoipa::path(
    get,
    path = "/api/sessions/search",
    params(
        ("q" = Option<String>, Query, description = "Substring of title or content"),
        ("tags" = Option<String>, Query, description = "Comma-separated tags"),
        ("sortBy" = Option<String>, Query, description = "createdAt, updatedAt or title"),
        ("sortOrder" = Option<String>, Query, description = "asc or desc"),
        ("page" = Option<u64>, Query, description = "1-based page"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 50")
    ),
    responses(
        (status = 200, description = "Matching sessions", body = ApiResponse<SearchResults>),
        (status = 400, description = "Unknown sort field or order")
    ),
    tag = "sessions"
)]
pub async fn search_sessions(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<ApiResponse<SearchResults>, ApiError> {
    let sort = search_sort(&params)?;
    let page = PageRequest::from_params(&params);
    let filter = SessionFilter {
        search: params.get("q").map(str::to_string),
        tags: params.list("tags"),
        ..SessionFilter::new(Scope::Published)
    };

    let (records, total) = sessions::list(&state.db, &filter, sort, page).await?;

    Ok(ApiResponse::success(SearchResults {
        sessions: with_owner_emails(&state, records).await?,
        pagination: PaginationMeta::new(page, total),
        search_query: SearchQuery {
            query: filter.search,
            tags: filter.tags,
            sort_by: sort.field,
            sort_order: sort.order,
        },
    }))
}

/// Tag usage across published sessions.
#[utoipa::path(
    get,
    path = "/api/sessions/tags",
    params(
        ("limit" = Option<u64>, Query, description = "Number of tags, default 50")
    ),
    responses(
        (status = 200, description = "Most used tags", body = ApiResponse<TagList>)
    ),
    tag = "sessions"
)]
pub async fn popular_tags(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<ApiResponse<TagList>, ApiError> {
    let limit = params
        .get_count("limit")
        .filter(|l| *l >= 1)
        .unwrap_or(DEFAULT_TAG_LIMIT)
        .min(i64::MAX as u64);

    let tags = sessions::tag_counts(&state.db, &Scope::Published, Some(limit)).await?;

    Ok(ApiResponse::success(TagList {
        total_unique_tags: tags.len(),
        tags,
    }))
}

/// One session. Owners see drafts; everyone else only published sessions,
/// with the owner reduced to an email.
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session", body = ApiResponse<SessionDetail>),
        (status = 400, description = "Invalid id format"),
        (status = 403, description = "Draft of another user"),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn get_session(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
) -> Result<ApiResponse<SessionDetail>, ApiError> {
    let record = lifecycle::found(sessions::find(&state.db, &id).await?)?;

    let access = lifecycle::read_access(&record.session, viewer.user_id())?;
    let session = match access {
        Viewer::Owner => SessionResponse::owned(record),
        Viewer::Public => {
            let email = users::find_by_id(&state.db, &record.session.owner_id)
                .await?
                .map(|u| u.email);
            SessionResponse::public(record, email)
        }
    };

    Ok(ApiResponse::success(SessionDetail {
        session,
        is_owner: access.is_owner(),
    }))
}

// ── Helpers ──

fn search_sort(params: &QueryParams) -> Result<Sort, ApiError> {
    let mut errors = Vec::new();

    let field = match params.get("sortBy").or_else(|| params.get("sort_by")) {
        None => Some(SortField::CreatedAt),
        Some(raw) => SortField::parse(raw),
    };
    if field.is_none() {
        errors.push("Sort field must be one of: createdAt, updatedAt, title".to_string());
    }

    let order = match params.get("sortOrder").or_else(|| params.get("sort_order")) {
        None => Some(SortOrder::Desc),
        Some(raw) => SortOrder::parse(raw),
    };
    if order.is_none() {
        errors.push(r#"Sort order must be either "asc" or "desc""#.to_string());
    }

    match (field, order) {
        (Some(field), Some(order)) => Ok(Sort { field, order }),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// Redacted views of `records`, each annotated with its owner's email.
async fn with_owner_emails(
    state: &AppState,
    records: Vec<SessionRecord>,
) -> Result<Vec<SessionResponse>, ApiError> {
    let emails = users::emails_by_id(
        &state.db,
        records.iter().map(|r| r.session.owner_id.clone()),
    )
    .await?;

    Ok(records
        .into_iter()
        .map(|record| {
            let email = emails.get(&record.session.owner_id).cloned();
            SessionResponse::public(record, email)
        })
        .collect())
}
