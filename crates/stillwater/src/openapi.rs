use utoipa::OpenApi;

use crate::app::Health;
use crate::controllers::auth::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
use crate::controllers::my_sessions::{DeleteResult, MySessionList, SessionData, SessionStats};
use crate::controllers::sessions::{SearchQuery, SearchResults, SessionDetail, SessionList, TagList};
use crate::extractors::PaginationMeta;
use crate::models::UserResponse;
use crate::models::session::{DeletedSession, PublicOwner, SessionResponse, SessionSummary, Status};
use crate::repository::{SortField, SortOrder, StatusCounts, TagCount};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stillwater API",
        version = "0.3.0",
        description = "Publish, browse and manage guided wellness sessions."
    ),
    paths(
        crate::app::health,
        crate::controllers::auth::register,
        crate::controllers::auth::login,
        crate::controllers::auth::me,
        crate::controllers::sessions::list_sessions,
        crate::controllers::sessions::search_sessions,
        crate::controllers::sessions::popular_tags,
        crate::controllers::sessions::get_session,
        crate::controllers::my_sessions::list_my_sessions,
        crate::controllers::my_sessions::stats,
        crate::controllers::my_sessions::get_my_session,
        crate::controllers::my_sessions::save_draft,
        crate::controllers::my_sessions::create_published,
        crate::controllers::my_sessions::update_session,
        crate::controllers::my_sessions::publish_session,
        crate::controllers::my_sessions::unpublish_session,
        crate::controllers::my_sessions::delete_session,
    ),
    components(
        schemas(
            Health,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            MeResponse,
            UserResponse,
            Status,
            PublicOwner,
            SessionResponse,
            SessionSummary,
            DeletedSession,
            PaginationMeta,
            SortField,
            SortOrder,
            StatusCounts,
            TagCount,
            SessionList,
            SearchQuery,
            SearchResults,
            TagList,
            SessionDetail,
            SessionData,
            MySessionList,
            SessionStats,
            DeleteResult,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Accounts and tokens"),
        (name = "sessions", description = "Published sessions, readable by anyone"),
        (name = "my-sessions", description = "The caller's own sessions")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/health",
            "/api/auth/register",
            "/api/sessions/{id}",
            "/api/my-sessions/{id}/unpublish",
            "/api/my-sessions/save-draft",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
