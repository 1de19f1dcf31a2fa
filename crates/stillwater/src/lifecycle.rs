//! Session lifecycle rules: the draft/published state machine, ownership,
//! and read visibility.
//!
//! These are pure checks over an already-loaded record; the controllers
//! call them between loading and writing.

use crate::error::ApiError;
use crate::models::Status;
use crate::models::session::Model as Session;

pub const CONTENT_REQUIRED_FOR_PUBLISHED: &str = "Content is required for published sessions";
pub const CONTENT_REQUIRED_TO_PUBLISH: &str = "Content is required to publish a session";
pub const ALREADY_PUBLISHED: &str = "Session is already published";
pub const ALREADY_DRAFT: &str = "Session is already a draft";
pub const ACCESS_DENIED: &str = "Access denied to this session";
pub const NOT_FOUND: &str = "Session not found";

/// How a caller may see a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Owner,
    Public,
}

impl Viewer {
    pub fn is_owner(&self) -> bool {
        matches!(self, Viewer::Owner)
    }
}

/// A published session must carry non-empty (trimmed) content.
pub fn ensure_publishable(status: Status, content: &str) -> Result<(), ApiError> {
    if status == Status::Published && content.trim().is_empty() {
        return Err(ApiError::BusinessRule(
            CONTENT_REQUIRED_FOR_PUBLISHED.to_string(),
        ));
    }
    Ok(())
}

/// Status after an update: the requested one, or the current one if none was asked for.
/// Either way the result must satisfy [`ensure_publishable`].
pub fn resolve_update(
    current: Status,
    requested: Option<Status>,
    content: &str,
) -> Result<Status, ApiError> {
    let next = requested.unwrap_or(current);
    ensure_publishable(next, content)?;
    Ok(next)
}

/// `draft -> published`.
pub fn publish(session: &Session) -> Result<Status, ApiError> {
    if session.status == Status::Published {
        return Err(ApiError::BusinessRule(ALREADY_PUBLISHED.to_string()));
    }
    if session.content.trim().is_empty() {
        return Err(ApiError::BusinessRule(CONTENT_REQUIRED_TO_PUBLISH.to_string()));
    }
    Ok(Status::Published)
}

/// `published -> draft`.
pub fn unpublish(session: &Session) -> Result<Status, ApiError> {
    if session.status == Status::Draft {
        return Err(ApiError::BusinessRule(ALREADY_DRAFT.to_string()));
    }
    Ok(Status::Draft)
}

/// Write access: only the owner.
pub fn ensure_owner(session: &Session, user_id: &str) -> Result<(), ApiError> {
    if session.is_owned_by(user_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(ACCESS_DENIED.to_string()))
    }
}

/// Read access: owners see everything, everyone else only published sessions.
pub fn read_access(session: &Session, viewer: Option<&str>) -> Result<Viewer, ApiError> {
    if viewer.is_some_and(|id| session.is_owned_by(id)) {
        return Ok(Viewer::Owner);
    }
    if session.is_published() {
        Ok(Viewer::Public)
    } else {
        Err(ApiError::Forbidden(ACCESS_DENIED.to_string()))
    }
}

/// Turn a lookup miss into the not-found error.
pub fn found<T>(record: Option<T>) -> Result<T, ApiError> {
    record.ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}
