//! Request-shape validation.
//!
//! Every validator here is a pure function from a raw JSON object to an
//! ordered list of human-readable errors; an empty list means "accept".
//! Handlers call the `*_input` wrappers, which turn a non-empty list into
//! [`ApiError::Validation`](crate::error::ApiError::Validation) and
//! otherwise return the normalized, typed payload. None of this touches the
//! database, and the entity models do not depend on it.

pub mod account;
pub mod session;

pub use account::{
    Login, Registration, login_input, registration_input, validate_login, validate_registration,
};
pub use session::{SessionInput, session_input, validate_session};

use serde_json::{Map, Value};

/// Field lookup that treats JSON `null` as absent.
pub(crate) fn field<'a>(body: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| body.get(*k))
        .find(|v| !v.is_null())
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
