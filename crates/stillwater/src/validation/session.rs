use serde_json::{Map, Value};
use validator::ValidateUrl;

use super::{char_len, field};
use crate::error::ApiError;
use crate::models::Status;

pub const TITLE_MAX: usize = 200;
pub const CONTENT_MAX: usize = 10_000;
pub const TAG_MAX: usize = 50;

/// Normalized session payload: strings trimmed, empty tags dropped, an
/// empty file URL turned into `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInput {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub save_file_url: Option<String>,
    /// Requested status, if any. Create endpoints ignore it.
    pub status: Option<Status>,
}

/// Check a session create/update payload. Errors come out in field order:
/// title, content, tags, file URL, status.
pub fn validate_session(body: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();

    match field(body, &["title"]) {
        None => errors.push("Session title is required".to_string()),
        Some(Value::String(title)) => {
            let title = title.trim();
            if title.is_empty() {
                errors.push("Session title is required".to_string());
            } else if char_len(title) > TITLE_MAX {
                errors.push(format!("Title cannot exceed {TITLE_MAX} characters"));
            }
        }
        Some(_) => errors.push("Session title must be a string".to_string()),
    }

    match field(body, &["content"]) {
        None => {}
        Some(Value::String(content)) => {
            if char_len(content.trim()) > CONTENT_MAX {
                errors.push(format!("Content cannot exceed {CONTENT_MAX} characters"));
            }
        }
        Some(_) => errors.push("Content must be a string".to_string()),
    }

    match field(body, &["tags"]) {
        None => {}
        Some(Value::Array(tags)) => {
            for (index, tag) in tags.iter().enumerate() {
                match tag {
                    Value::String(tag) if char_len(tag.trim()) > TAG_MAX => errors.push(format!(
                        "Tag at index {index} cannot exceed {TAG_MAX} characters"
                    )),
                    Value::String(_) => {}
                    _ => errors.push(format!("Tag at index {index} must be a string")),
                }
            }
        }
        Some(_) => errors.push("Tags must be an array".to_string()),
    }

    match field(body, &["saveFileUrl", "save_file_url"]) {
        None => {}
        Some(Value::String(url)) if url.trim().is_empty() => {}
        Some(Value::String(url)) if url.trim().validate_url() => {}
        Some(_) => errors.push("Save file URL must be a valid URL".to_string()),
    }

    match field(body, &["status"]) {
        None => {}
        Some(Value::String(status)) if Status::parse(status).is_some() => {}
        Some(_) => errors.push(r#"Status must be either "draft" or "published""#.to_string()),
    }

    errors
}

/// Validate then normalize a session payload.
pub fn session_input(body: &Map<String, Value>) -> Result<SessionInput, ApiError> {
    let errors = validate_session(body);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let text = |keys: &[&str]| -> String {
        field(body, keys)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let tags = field(body, &["tags"])
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let save_file_url = Some(text(&["saveFileUrl", "save_file_url"])).filter(|u| !u.is_empty());

    let status = field(body, &["status"])
        .and_then(Value::as_str)
        .and_then(Status::parse);

    Ok(SessionInput {
        title: text(&["title"]),
        content: text(&["content"]),
        tags,
        save_file_url,
        status,
    })
}
