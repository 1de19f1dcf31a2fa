use serde_json::json;
use stillwater::TestApp;

const MISSING_ID: &str = "507f1f77bcf86cd799439011";

#[tokio::test]
async fn test_save_draft_ignores_requested_status() {
    let app = TestApp::new().await;
    let (token, user) = app.create_user("owner@example.com", "password123").await;

    let session = app
        .create_session(
            &token,
            json!({
                "title": "  Body scan  ",
                "content": "",
                "tags": ["sleep", " ", "calm "],
                "status": "published"
            }),
            false,
        )
        .await;

    assert_eq!(session["status"], "draft");
    assert_eq!(session["title"], "Body scan");
    assert_eq!(session["tags"], json!(["sleep", "calm"]));
    assert_eq!(session["ownerId"], user["id"]);
    assert!(session["saveFileUrl"].is_null());
    assert_eq!(session["createdAt"], session["updatedAt"]);
}

#[tokio::test]
async fn test_create_published_without_content_is_rejected() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    let res = app
        .client
        .post_with_auth(
            &app.url("/api/my-sessions/publish"),
            &token,
            &json!({ "title": "Empty", "content": "   " }).to_string(),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "BUSINESS_RULE_VIOLATION");
    assert_eq!(
        res.json()["message"],
        "Content is required for published sessions"
    );

    // Nothing was stored.
    let list = app
        .client
        .get_with_auth(&app.url("/api/my-sessions"), &token)
        .await;
    assert_eq!(list.data()["summary"]["total"], 0);
}

#[tokio::test]
async fn test_validation_reports_every_field_error() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    let res = app
        .client
        .post_with_auth(
            &app.url("/api/my-sessions/save-draft"),
            &token,
            &json!({
                "title": "",
                "tags": ["ok", 3],
                "saveFileUrl": "not a url",
                "status": "archived"
            })
            .to_string(),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(
        res.errors(),
        vec![
            "Session title is required",
            "Tag at index 1 must be a string",
            "Save file URL must be a valid URL",
            r#"Status must be either "draft" or "published""#,
        ]
    );
}

#[tokio::test]
async fn test_malformed_bodies() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;
    let url = app.url("/api/my-sessions/save-draft");

    let res = app.client.post_with_auth(&url, &token, "").await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "BAD_REQUEST");

    let res = app.client.post_with_auth(&url, &token, "{not json").await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "BAD_REQUEST");

    let res = app.client.post_with_auth(&url, &token, "[1, 2]").await;
    assert_eq!(res.status, 400);
    assert_eq!(res.json()["message"], "Request body must be a JSON object");
}

#[tokio::test]
async fn test_publish_and_unpublish_transitions() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    let empty = app
        .create_session(&token, json!({ "title": "No words yet" }), false)
        .await;
    let id = empty["id"].as_str().unwrap();

    // Empty content cannot be published.
    let res = app
        .client
        .put_with_auth(&app.url(&format!("/api/my-sessions/{id}/publish")), &token, "")
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(
        res.json()["message"],
        "Content is required to publish a session"
    );

    // A draft cannot be unpublished.
    let res = app
        .client
        .put_with_auth(
            &app.url(&format!("/api/my-sessions/{id}/unpublish")),
            &token,
            "",
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.json()["message"], "Session is already a draft");

    let draft = app
        .create_session(
            &token,
            json!({ "title": "Ready", "content": "Breathe." }),
            false,
        )
        .await;
    let id = draft["id"].as_str().unwrap();

    let res = app
        .client
        .put_with_auth(&app.url(&format!("/api/my-sessions/{id}/publish")), &token, "")
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["message"], "Session published successfully");
    assert_eq!(res.data()["session"]["status"], "published");

    let res = app
        .client
        .put_with_auth(&app.url(&format!("/api/my-sessions/{id}/publish")), &token, "")
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.json()["message"], "Session is already published");

    let res = app
        .client
        .put_with_auth(
            &app.url(&format!("/api/my-sessions/{id}/unpublish")),
            &token,
            "",
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["session"]["status"], "draft");
}

#[tokio::test]
async fn test_update_round_trip() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    let created = app
        .create_session(
            &token,
            json!({ "title": "Before", "content": "old", "tags": ["a", "b"] }),
            false,
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let payload = json!({
        "title": "After",
        "content": "new words",
        "tags": ["c"],
        "saveFileUrl": "https://files.example.com/after.json",
        "status": "published"
    });
    let res = app
        .client
        .put_with_auth(
            &app.url(&format!("/api/my-sessions/{id}")),
            &token,
            &payload.to_string(),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["message"], "Session updated successfully");

    let res = app
        .client
        .get_with_auth(&app.url(&format!("/api/my-sessions/{id}")), &token)
        .await;
    assert_eq!(res.status, 200);

    let session = res.data()["session"].clone();
    assert_eq!(session["title"], "After");
    assert_eq!(session["content"], "new words");
    assert_eq!(session["tags"], json!(["c"]));
    assert_eq!(session["saveFileUrl"], "https://files.example.com/after.json");
    assert_eq!(session["status"], "published");
    assert_eq!(session["createdAt"], created["createdAt"]);

    let created_at: chrono::DateTime<chrono::Utc> =
        session["createdAt"].as_str().unwrap().parse().unwrap();
    let updated_at: chrono::DateTime<chrono::Utc> =
        session["updatedAt"].as_str().unwrap().parse().unwrap();
    assert!(updated_at > created_at);
}

#[tokio::test]
async fn test_update_keeps_published_sessions_publishable() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    let published = app
        .create_session(&token, json!({ "title": "Live", "content": "words" }), true)
        .await;
    let id = published["id"].as_str().unwrap();

    // Retained status is published, so emptying content is refused.
    let res = app
        .client
        .put_with_auth(
            &app.url(&format!("/api/my-sessions/{id}")),
            &token,
            &json!({ "title": "Live", "content": "" }).to_string(),
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(
        res.json()["message"],
        "Content is required for published sessions"
    );

    // Moving back to draft in the same update is allowed.
    let res = app
        .client
        .put_with_auth(
            &app.url(&format!("/api/my-sessions/{id}")),
            &token,
            &json!({ "title": "Live", "content": "", "status": "draft" }).to_string(),
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["session"]["status"], "draft");
}

#[tokio::test]
async fn test_not_found_and_access_denied_are_distinct() {
    let app = TestApp::new().await;
    let (owner, _) = app.create_user("owner@example.com", "password123").await;
    let (intruder, _) = app.create_user("intruder@example.com", "password123").await;

    let session = app
        .create_session(&owner, json!({ "title": "Mine", "content": "x" }), false)
        .await;
    let id = session["id"].as_str().unwrap();
    let update = json!({ "title": "Theirs" }).to_string();

    let res = app
        .client
        .put_with_auth(&app.url(&format!("/api/my-sessions/{MISSING_ID}")), &intruder, &update)
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.json()["message"], "Session not found");

    let res = app
        .client
        .put_with_auth(&app.url(&format!("/api/my-sessions/{id}")), &intruder, &update)
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.code(), "ACCESS_DENIED");

    for path in ["publish", "unpublish"] {
        let res = app
            .client
            .put_with_auth(
                &app.url(&format!("/api/my-sessions/{id}/{path}")),
                &intruder,
                "",
            )
            .await;
        assert_eq!(res.status, 403);
    }

    let res = app
        .client
        .get_with_auth(&app.url(&format!("/api/my-sessions/{id}")), &intruder)
        .await;
    assert_eq!(res.status, 403);

    let res = app
        .client
        .delete_with_auth(&app.url(&format!("/api/my-sessions/{id}")), &intruder)
        .await;
    assert_eq!(res.status, 403);

    // Still intact for the owner.
    let res = app
        .client
        .get_with_auth(&app.url(&format!("/api/my-sessions/{id}")), &owner)
        .await;
    assert_eq!(res.data()["session"]["title"], "Mine");
}

#[tokio::test]
async fn test_malformed_id_rejected_before_authentication() {
    let app = TestApp::new().await;

    // No token at all: the id check still wins.
    let res = app
        .client
        .delete_with_auth(&app.url("/api/my-sessions/not-an-id"), "")
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
    assert_eq!(res.errors(), vec!["Invalid id format"]);

    let res = app.client.get(&app.url("/api/sessions/not-an-id")).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.errors(), vec!["Invalid id format"]);

    let body = json!({ "title": "Whatever" }).to_string();
    for path in [
        "/api/my-sessions/not-an-id",
        "/api/my-sessions/not-an-id/publish",
        "/api/my-sessions/not-an-id/unpublish",
    ] {
        let res = app.client.put_with_auth(&app.url(path), "", &body).await;
        assert_eq!(res.status, 400, "PUT {path}");
        assert_eq!(res.errors(), vec!["Invalid id format"], "PUT {path}");
    }

    let res = app
        .client
        .get_with_auth(&app.url("/api/my-sessions/not-an-id"), "")
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.errors(), vec!["Invalid id format"]);

    // 23 hex digits: right alphabet, wrong length.
    let res = app
        .client
        .get(&app.url("/api/sessions/507f1f77bcf86cd79943901"))
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn test_delete_returns_deleted_summary() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    let session = app
        .create_session(
            &token,
            json!({ "title": "Short", "content": "x", "tags": ["gone"] }),
            true,
        )
        .await;
    let id = session["id"].as_str().unwrap();

    let res = app
        .client
        .delete_with_auth(&app.url(&format!("/api/my-sessions/{id}")), &token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["message"], "Session deleted successfully");
    assert_eq!(
        res.data()["deletedSession"],
        json!({ "id": id, "title": "Short", "status": "published" })
    );

    let res = app
        .client
        .get_with_auth(&app.url(&format!("/api/my-sessions/{id}")), &token)
        .await;
    assert_eq!(res.status, 404);

    // Its tags no longer count.
    let res = app.client.get(&app.url("/api/sessions/tags")).await;
    assert_eq!(res.data()["tags"], json!([]));
}

#[tokio::test]
async fn test_concurrent_updates_leave_one_whole_payload() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    let session = app
        .create_session(&token, json!({ "title": "Start", "content": "0" }), false)
        .await;
    let url = app.url(&format!("/api/my-sessions/{}", session["id"].as_str().unwrap()));

    let first = json!({ "title": "First", "content": "one", "tags": ["x", "y"] });
    let second = json!({ "title": "Second", "content": "two", "tags": ["z"] });

    let first_body = first.to_string();
    let second_body = second.to_string();
    let (a, b) = tokio::join!(
        app.client.put_with_auth(&url, &token, &first_body),
        app.client.put_with_auth(&url, &token, &second_body),
    );
    assert_eq!(a.status, 200);
    assert_eq!(b.status, 200);

    let stored = app.client.get_with_auth(&url, &token).await.data()["session"].clone();
    let stored_view = json!({
        "title": stored["title"],
        "content": stored["content"],
        "tags": stored["tags"],
    });
    assert!(
        stored_view == first || stored_view == second,
        "mixed state: {stored_view}"
    );
}

#[tokio::test]
async fn test_owner_routes_require_token() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/api/my-sessions")).await;
    assert_eq!(res.status, 401);

    let res = app
        .client
        .post(
            &app.url("/api/my-sessions/save-draft"),
            &json!({ "title": "x" }).to_string(),
        )
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.code(), "UNAUTHORIZED");
}
