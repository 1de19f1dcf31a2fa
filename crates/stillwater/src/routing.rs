use axum::Router;
use axum::routing::get;

use crate::app::health;
use crate::controllers::{AppState, auth, my_sessions, sessions};

/// Every API route, before state, docs and middleware are applied.
pub fn build_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth::routes())
        .nest("/api/sessions", sessions::routes())
        .nest("/api/my-sessions", my_sessions::routes())
}
