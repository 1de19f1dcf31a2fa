use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{AuthPayload, User};

/// What survives between runs: the bearer token and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAuth {
    pub token: String,
    pub user: User,
}

impl From<AuthPayload> for StoredAuth {
    fn from(payload: AuthPayload) -> Self {
        StoredAuth {
            token: payload.token,
            user: payload.user,
        }
    }
}

/// Persistence for the signed-in identity.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredAuth>, ClientError>;
    async fn save(&self, auth: &StoredAuth) -> Result<(), ClientError>;
    async fn clear(&self) -> Result<(), ClientError>;
}

/// Process-local store, forgotten on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Option<StoredAuth>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> Result<Option<StoredAuth>, ClientError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, auth: &StoredAuth) -> Result<(), ClientError> {
        *self.inner.write().await = Some(auth.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *self.inner.write().await = None;
        Ok(())
    }
}

/// JSON file store. A missing file means "signed out".
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn load(&self) -> Result<Option<StoredAuth>, ClientError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, auth: &StoredAuth) -> Result<(), ClientError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(auth)?).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// The signed-in identity of one client.
///
/// Loaded from its store on construction, written back on login and
/// register, cleared on logout. Pass it to whatever needs a token.
pub struct AuthContext {
    client: ApiClient,
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<StoredAuth>>,
}

impl AuthContext {
    pub async fn load(
        client: ApiClient,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ClientError> {
        let current = store.load().await?;
        if let Some(auth) = &current {
            tracing::debug!(user_id = %auth.user.id, "restored signed-in user");
        }
        Ok(AuthContext {
            client,
            store,
            current: RwLock::new(current),
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let payload = self.client.login(email, password).await?;
        self.remember(payload.into()).await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, ClientError> {
        let payload = self.client.register(email, password, name).await?;
        self.remember(payload.into()).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        *self.current.write().await = None;
        self.store.clear().await
    }

    pub async fn user(&self) -> Option<User> {
        self.current.read().await.as_ref().map(|a| a.user.clone())
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|a| a.token.clone())
    }

    /// The token, or [`ClientError::NotAuthenticated`].
    pub async fn require_token(&self) -> Result<String, ClientError> {
        self.token().await.ok_or(ClientError::NotAuthenticated)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    async fn remember(&self, auth: StoredAuth) -> Result<User, ClientError> {
        self.store.save(&auth).await?;
        let user = auth.user.clone();
        *self.current.write().await = Some(auth);
        Ok(user)
    }
}
