use serde_json::{Map, Value};
use validator::ValidateEmail;

use super::{char_len, field};
use crate::error::ApiError;

pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 128;
pub const NAME_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Trimmed and lowercased.
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub email: String,
    pub password: String,
}

fn check_email(body: &Map<String, Value>, errors: &mut Vec<String>) {
    match field(body, &["email"]).and_then(Value::as_str).map(str::trim) {
        None | Some("") => errors.push("Email is required".to_string()),
        Some(email) if !email.validate_email() => {
            errors.push("Please provide a valid email address".to_string())
        }
        Some(_) => {}
    }
}

pub fn validate_registration(body: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();
    check_email(body, &mut errors);

    match field(body, &["password"]).and_then(Value::as_str) {
        None | Some("") => errors.push("Password is required".to_string()),
        Some(p) if char_len(p) < PASSWORD_MIN => errors.push(format!(
            "Password must be at least {PASSWORD_MIN} characters long"
        )),
        Some(p) if char_len(p) > PASSWORD_MAX => {
            errors.push(format!("Password cannot exceed {PASSWORD_MAX} characters"))
        }
        Some(_) => {}
    }

    match field(body, &["name"]) {
        None => {}
        Some(Value::String(name)) if char_len(name.trim()) > NAME_MAX => {
            errors.push(format!("Name cannot exceed {NAME_MAX} characters"))
        }
        Some(Value::String(_)) => {}
        Some(_) => errors.push("Name must be a string".to_string()),
    }

    errors
}

pub fn validate_login(body: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();
    check_email(body, &mut errors);

    match field(body, &["password"]).and_then(Value::as_str) {
        None | Some("") => errors.push("Password is required".to_string()),
        Some(_) => {}
    }

    errors
}

fn email_of(body: &Map<String, Value>) -> String {
    field(body, &["email"])
        .and_then(Value::as_str)
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default()
}

fn password_of(body: &Map<String, Value>) -> String {
    field(body, &["password"])
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn registration_input(body: &Map<String, Value>) -> Result<Registration, ApiError> {
    let errors = validate_registration(body);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Ok(Registration {
        email: email_of(body),
        password: password_of(body),
        name: field(body, &["name"])
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    })
}

pub fn login_input(body: &Map<String, Value>) -> Result<Login, ApiError> {
    let errors = validate_login(body);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Ok(Login {
        email: email_of(body),
        password: password_of(body),
    })
}
