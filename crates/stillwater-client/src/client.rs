use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::models::{
    AuthPayload, DeleteData, DeletedSession, MySessionPage, SearchPage, Session, SessionData,
    SessionDetail, SessionDraft, SessionPage, SessionStats, SessionStatus, TagList, User,
    UserData,
};

/// Response envelope shared by every endpoint.
#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    data: Option<T>,
    #[serde(default)]
    errors: Vec<String>,
}

/// Filters for the public and owner listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub tags: Vec<String>,
    /// Owner listing only.
    pub status: Option<SessionStatus>,
}

impl ListQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status_str(status).to_string()));
        }
        pairs
    }
}

/// Parameters of `/api/sessions/search`. Sort values are passed through
/// as-is; the server rejects unknown ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub q: Option<String>,
    pub tags: Vec<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl SearchParams {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy", sort_by.clone()));
        }
        if let Some(sort_order) = &self.sort_order {
            pairs.push(("sortOrder", sort_order.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

fn status_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Draft => "draft",
        SessionStatus::Published => "published",
    }
}

/// HTTP client for one Stillwater server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Auth ──

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthPayload, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password, "name": name });
        self.send(self.request(Method::POST, "/api/auth/register", None).json(&body))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.send(self.request(Method::POST, "/api/auth/login", None).json(&body))
            .await
    }

    pub async fn me(&self, token: &str) -> Result<User, ClientError> {
        let data: UserData = self
            .send(self.request(Method::GET, "/api/auth/me", Some(token)))
            .await?;
        Ok(data.user)
    }

    // ── Public sessions ──

    pub async fn list_sessions(
        &self,
        token: Option<&str>,
        query: &ListQuery,
    ) -> Result<SessionPage, ClientError> {
        self.send(
            self.request(Method::GET, "/api/sessions", token)
                .query(&query.pairs()),
        )
        .await
    }

    pub async fn search_sessions(&self, params: &SearchParams) -> Result<SearchPage, ClientError> {
        self.send(
            self.request(Method::GET, "/api/sessions/search", None)
                .query(&params.pairs()),
        )
        .await
    }

    pub async fn popular_tags(&self, limit: Option<u64>) -> Result<TagList, ClientError> {
        let mut request = self.request(Method::GET, "/api/sessions/tags", None);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        self.send(request).await
    }

    pub async fn get_session(
        &self,
        token: Option<&str>,
        id: &str,
    ) -> Result<SessionDetail, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/sessions/{id}"), token))
            .await
    }

    // ── Own sessions ──

    pub async fn my_sessions(
        &self,
        token: &str,
        query: &ListQuery,
    ) -> Result<MySessionPage, ClientError> {
        self.send(
            self.request(Method::GET, "/api/my-sessions", Some(token))
                .query(&query.pairs()),
        )
        .await
    }

    pub async fn my_stats(&self, token: &str) -> Result<SessionStats, ClientError> {
        self.send(self.request(Method::GET, "/api/my-sessions/stats", Some(token)))
            .await
    }

    pub async fn my_session(&self, token: &str, id: &str) -> Result<Session, ClientError> {
        self.session(self.request(Method::GET, &format!("/api/my-sessions/{id}"), Some(token)))
            .await
    }

    pub async fn save_draft(
        &self,
        token: &str,
        draft: &SessionDraft,
    ) -> Result<Session, ClientError> {
        self.session(
            self.request(Method::POST, "/api/my-sessions/save-draft", Some(token))
                .json(draft),
        )
        .await
    }

    pub async fn create_published(
        &self,
        token: &str,
        draft: &SessionDraft,
    ) -> Result<Session, ClientError> {
        self.session(
            self.request(Method::POST, "/api/my-sessions/publish", Some(token))
                .json(draft),
        )
        .await
    }

    pub async fn update_session(
        &self,
        token: &str,
        id: &str,
        draft: &SessionDraft,
    ) -> Result<Session, ClientError> {
        self.session(
            self.request(Method::PUT, &format!("/api/my-sessions/{id}"), Some(token))
                .json(draft),
        )
        .await
    }

    pub async fn publish(&self, token: &str, id: &str) -> Result<Session, ClientError> {
        self.session(self.request(
            Method::PUT,
            &format!("/api/my-sessions/{id}/publish"),
            Some(token),
        ))
        .await
    }

    pub async fn unpublish(&self, token: &str, id: &str) -> Result<Session, ClientError> {
        self.session(self.request(
            Method::PUT,
            &format!("/api/my-sessions/{id}/unpublish"),
            Some(token),
        ))
        .await
    }

    pub async fn delete_session(
        &self,
        token: &str,
        id: &str,
    ) -> Result<DeletedSession, ClientError> {
        let data: DeleteData = self
            .send(self.request(Method::DELETE, &format!("/api/my-sessions/{id}"), Some(token)))
            .await?;
        Ok(data.deleted_session)
    }

    // ── Plumbing ──

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn session(&self, request: RequestBuilder) -> Result<Session, ClientError> {
        let data: SessionData = self.send(request).await?;
        Ok(data.session)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let envelope: Envelope<T> = serde_json::from_slice(&body)?;
            return envelope.data.ok_or_else(|| ClientError::Api {
                status: status.as_u16(),
                code: None,
                message: "Response carried no data".to_string(),
                errors: Vec::new(),
            });
        }

        let envelope: Option<Envelope<serde_json::Value>> = serde_json::from_slice(&body).ok();
        let (message, code, errors) = match envelope {
            Some(e) => (e.message, e.code, e.errors),
            None => (None, None, Vec::new()),
        };

        tracing::debug!(status = status.as_u16(), ?code, "request rejected");

        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message: message.unwrap_or_else(|| status.to_string()),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(ApiClient::new("http://localhost:5000/").base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_list_query_pairs() {
        let query = ListQuery {
            page: Some(2),
            tags: vec!["calm".into(), "sleep".into()],
            status: Some(SessionStatus::Draft),
            ..Default::default()
        };
        assert_eq!(
            query.pairs(),
            vec![
                ("page", "2".to_string()),
                ("tags", "calm,sleep".to_string()),
                ("status", "draft".to_string()),
            ]
        );
        assert!(ListQuery::default().pairs().is_empty());
    }
}
