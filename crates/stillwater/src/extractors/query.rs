use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Raw query-string pairs, in order, with repeated keys preserved.
///
/// Listing endpoints parse their parameters leniently (a non-numeric page is
/// page 1, not an error), so they read from this instead of a strict
/// `Query<T>`.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(pub Vec<(String, String)>);

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        QueryParams(serde_urlencoded::from_str(query).unwrap_or_default())
    }

    /// First value for `key`, trimmed; empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Lenient unsigned integer: absent or unparsable values are `None`.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Like [`get_u64`](Self::get_u64), but a run of digits too large for
    /// `u64` saturates to `u64::MAX` instead of being discarded.
    pub fn get_count(&self, key: &str) -> Option<u64> {
        let v = self.get(key)?;
        match v.parse() {
            Ok(n) => Some(n),
            Err(_) if v.bytes().all(|b| b.is_ascii_digit()) => Some(u64::MAX),
            Err(_) => None,
        }
    }

    /// Every comma-separated entry of every `key` occurrence, trimmed, empties dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key || k.strip_suffix("[]") == Some(key))
            .flat_map(|(_, v)| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(QueryParams::parse(parts.uri.query().unwrap_or("")))
    }
}
