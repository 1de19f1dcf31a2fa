//! Owner surface: everything under `/api/my-sessions`. Every route requires
//! a bearer token and only ever touches the caller's own sessions.

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Router, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::extractors::{AuthUser, EntityId, JsonBody, PageRequest, PaginationMeta, QueryParams};
use crate::lifecycle;
use crate::models::session::{DeletedSession, SessionSummary};
use crate::models::{SessionResponse, Status};
use crate::repository::{Scope, SessionFilter, Sort, StatusCounts, TagCount, sessions};
use crate::response::ApiResponse;
use crate::validation::session_input;

use super::AppState;

const RECENT_SESSIONS: u64 = 5;
const TOP_TAGS: usize = 10;

// ── Response types ──

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionData {
    pub session: SessionResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MySessionList {
    pub sessions: Vec<SessionResponse>,
    pub pagination: PaginationMeta,
    /// Counts over all of the caller's sessions, ignoring filters.
    pub summary: StatusCounts,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub summary: StatusCounts,
    pub recent_sessions: Vec<SessionSummary>,
    pub most_used_tags: Vec<TagCount>,
    /// Distinct tags across all of the caller's sessions.
    pub total_tags: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_session: DeletedSession,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_sessions))
        .route("/stats", get(stats))
        .route("/save-draft", post(save_draft))
        .route("/publish", post(create_published))
        .route(
            "/{id}",
            get(get_my_session).put(update_session).delete(delete_session),
        )
        .route("/{id}/publish", put(publish_session))
        .route("/{id}/unpublish", put(unpublish_session))
}

// ── Handlers ──

/// The caller's sessions of any status, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/my-sessions",
    params(
        ("page" = Option<u64>, Query, description = "1-based page"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 50"),
        ("status" = Option<String>, Query, description = "draft or published"),
        ("search" = Option<String>, Query, description = "Substring of title or content")
    ),
    responses(
        (status = 200, description = "Caller's sessions", body = ApiResponse<MySessionList>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "my-sessions",
    security(("bearer_auth" = []))
)]
pub async fn list_my_sessions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    params: QueryParams,
) -> Result<ApiResponse<MySessionList>, ApiError> {
    let page = PageRequest::from_params(&params);
    let filter = SessionFilter {
        status: params.get("status").and_then(Status::parse),
        search: params.get("search").map(str::to_string),
        ..SessionFilter::new(Scope::Owner(user_id.clone()))
    };

    let (records, total) = sessions::list(&state.db, &filter, Sort::NEWEST_UPDATED, page).await?;
    let summary = sessions::status_counts(&state.db, &user_id).await?;

    Ok(ApiResponse::success(MySessionList {
        sessions: records.into_iter().map(SessionResponse::owned).collect(),
        pagination: PaginationMeta::new(page, total),
        summary,
    }))
}

/// Counts, recent activity and tag usage for the caller.
#[utoipa::path(
    get,
    path = "/api/my-sessions/stats",
    responses(
        (status = 200, description = "Caller's statistics", body = ApiResponse<SessionStats>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "my-sessions",
    security(("bearer_auth" = []))
)]
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<SessionStats>, ApiError> {
    let summary = sessions::status_counts(&state.db, &user_id).await?;
    let recent = sessions::recently_updated(&state.db, &user_id, RECENT_SESSIONS).await?;
    let mut tags = sessions::tag_counts(&state.db, &Scope::Owner(user_id), None).await?;

    let total_tags = tags.len();
    tags.truncate(TOP_TAGS);

    Ok(ApiResponse::success(SessionStats {
        summary,
        recent_sessions: recent.into_iter().map(SessionSummary::from).collect(),
        most_used_tags: tags,
        total_tags,
    }))
}

/// One of the caller's sessions, for editing.
#[utoipa::path(
    get,
    path = "/api/my-sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session", body = ApiResponse<SessionData>),
        (status = 400, description = "Invalid id format"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Session not found")
    ),
    tag = "my-sessions",
    security(("bearer_auth" = []))
)]
pub async fn get_my_session(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<SessionData>, ApiError> {
    let record = lifecycle::found(sessions::find(&state.db, &id).await?)?;
    lifecycle::ensure_owner(&record.session, &user_id)?;

    Ok(ApiResponse::success(SessionData {
        session: SessionResponse::owned(record),
    }))
}

/// Create a draft. Any `status` in the body is ignored.
#[utoipa::path(
    post,
    path = "/api/my-sessions/save-draft",
    responses(
        (status = 201, description = "Draft saved", body = ApiResponse<SessionData>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "my-sessions",
    security(("bearer_auth" = []))
)]
pub async fn save_draft(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, ApiResponse<SessionData>), ApiError> {
    let input = session_input(&body)?;
    let record = sessions::create(&state.db, &user_id, input, Status::Draft).await?;

    tracing::info!(session_id = %record.session.id, owner_id = %user_id, "draft created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(SessionData {
            session: SessionResponse::owned(record),
        })
        .with_message("Draft session saved successfully"),
    ))
}

/// Create a session directly in the published state.
#[utoipa::path(
    post,
    path = "/api/my-sessions/publish",
    responses(
        (status = 201, description = "Session published", body = ApiResponse<SessionData>),
        (status = 400, description = "Validation failed or content missing"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "my-sessions",
    security(("bearer_auth" = []))
)]
pub async fn create_published(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, ApiResponse<SessionData>), ApiError> {
    let input = session_input(&body)?;
    lifecycle::ensure_publishable(Status::Published, &input.content)?;
    let record = sessions::create(&state.db, &user_id, input, Status::Published).await?;

    tracing::info!(session_id = %record.session.id, owner_id = %user_id, "session published");

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(SessionData {
            session: SessionResponse::owned(record),
        })
        .with_message("Session published successfully"),
    ))
}

/// Replace a session's fields, optionally changing its status.
#[utoipa::path(
    put,
    path = "/api/my-sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session updated", body = ApiResponse<SessionData>),
        (status = 400, description = "Validation failed or content missing"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Session not found")
    ),
    tag = "my-sessions",
    security(("bearer_auth" = []))
)]
pub async fn update_session(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<SessionData>, ApiError> {
    let input = session_input(&body)?;

    let current = lifecycle::found(sessions::find_model(&state.db, &id).await?)?;
    lifecycle::ensure_owner(&current, &user_id)?;
    let status = lifecycle::resolve_update(current.status, input.status, &input.content)?;

    let record = sessions::update(&state.db, current, input, status).await?;

    tracing::info!(
        session_id = %record.session.id,
        owner_id = %user_id,
        status = record.session.status.as_str(),
        "session updated"
    );

    Ok(ApiResponse::success(SessionData {
        session: SessionResponse::owned(record),
    })
    .with_message("Session updated successfully"))
}

/// `draft -> published`.
#[utoipa::path(
    put,
    path = "/api/my-sessions/{id}/publish",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session published", body = ApiResponse<SessionData>),
        (status = 400, description = "Already published or content missing"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Session not found")
    ),
    tag = "my-sessions",
    security(("bearer_auth" = []))
)]
pub async fn publish_session(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<SessionData>, ApiError> {
    let current = lifecycle::found(sessions::find_model(&state.db, &id).await?)?;
    lifecycle::ensure_owner(&current, &user_id)?;
    let status = lifecycle::publish(&current)?;

    let record = sessions::set_status(&state.db, current, status).await?;

    tracing::info!(session_id = %record.session.id, owner_id = %user_id, "session published");

    Ok(ApiResponse::success(SessionData {
        session: SessionResponse::owned(record),
    })
    .with_message("Session published successfully"))
}

/// `published -> draft`.
#[utoipa::path(
    put,
    path = "/api/my-sessions/{id}/unpublish",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session unpublished", body = ApiResponse<SessionData>),
        (status = 400, description = "Already a draft"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Session not found")
    ),
    tag = "my-sessions",
    security(("bearer_auth" = []))
)]
pub async fn unpublish_session(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<SessionData>, ApiError> {
    let current = lifecycle::found(sessions::find_model(&state.db, &id).await?)?;
    lifecycle::ensure_owner(&current, &user_id)?;
    let status = lifecycle::unpublish(&current)?;

    let record = sessions::set_status(&state.db, current, status).await?;

    tracing::info!(session_id = %record.session.id, owner_id = %user_id, "session unpublished");

    Ok(ApiResponse::success(SessionData {
        session: SessionResponse::owned(record),
    })
    .with_message("Session unpublished successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/my-sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session deleted", body = ApiResponse<DeleteResult>),
        (status = 400, description = "Invalid id format"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Session not found")
    ),
    tag = "my-sessions",
    security(("bearer_auth" = []))
)]
pub async fn delete_session(
    EntityId(id): EntityId,
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<DeleteResult>, ApiError> {
    let current = lifecycle::found(sessions::find_model(&state.db, &id).await?)?;
    lifecycle::ensure_owner(&current, &user_id)?;

    sessions::delete(&state.db, &current.id).await?;

    tracing::info!(session_id = %current.id, owner_id = %user_id, "session deleted");

    Ok(ApiResponse::success(DeleteResult {
        deleted_session: DeletedSession {
            id: current.id,
            title: current.title,
            status: current.status,
        },
    })
    .with_message("Session deleted successfully"))
}
