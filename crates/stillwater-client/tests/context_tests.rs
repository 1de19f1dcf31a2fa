use std::sync::Arc;

use chrono::Utc;
use stillwater_client::{
    ApiClient, AuthContext, ClientError, FileStore, MemoryStore, SessionStore, StoredAuth, User,
};

fn stored() -> StoredAuth {
    StoredAuth {
        token: "token-123".to_string(),
        user: User {
            id: "507f191e810c19729de860ea".to_string(),
            email: "calm@example.com".to_string(),
            name: None,
            created_at: Utc::now(),
        },
    }
}

#[tokio::test]
async fn test_memory_store_round_trip() {
    let store = MemoryStore::new();
    assert_eq!(store.load().await.unwrap(), None);

    store.save(&stored()).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(stored()));

    store.clear().await.unwrap();
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("nested").join("auth.json"));

    assert_eq!(store.load().await.unwrap(), None);
    // Clearing an absent file is not an error.
    store.clear().await.unwrap();

    store.save(&stored()).await.unwrap();
    let reopened = FileStore::new(dir.path().join("nested").join("auth.json"));
    assert_eq!(reopened.load().await.unwrap(), Some(stored()));

    reopened.clear().await.unwrap();
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_file_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth.json");
    std::fs::write(&path, b"{ nope").unwrap();

    let err = FileStore::new(&path).load().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_context_restores_and_clears() {
    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
    store.save(&stored()).await.unwrap();

    let context = AuthContext::load(ApiClient::new("http://127.0.0.1:9"), store.clone())
        .await
        .unwrap();
    assert!(context.is_authenticated().await);
    assert_eq!(context.token().await.as_deref(), Some("token-123"));
    assert_eq!(context.user().await.unwrap().email, "calm@example.com");

    context.logout().await.unwrap();
    assert!(!context.is_authenticated().await);
    assert!(matches!(
        context.require_token().await,
        Err(ClientError::NotAuthenticated)
    ));
    assert_eq!(store.load().await.unwrap(), None);
}
