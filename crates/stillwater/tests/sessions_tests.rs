use serde_json::{Value, json};
use stillwater::TestApp;

async fn publish_many(app: &TestApp, token: &str, count: usize) {
    for i in 0..count {
        app.create_session(
            token,
            json!({ "title": format!("Session {i:02}"), "content": "breathe" }),
            true,
        )
        .await;
    }
}

fn titles(data: &Value) -> Vec<String> {
    data["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_public_listing_paginates() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;
    publish_many(&app, &token, 25).await;

    let res = app
        .client
        .get(&app.url("/api/sessions?page=3&limit=10"))
        .await;
    assert_eq!(res.status, 200);

    let data = res.data();
    assert_eq!(data["sessions"].as_array().unwrap().len(), 5);
    assert_eq!(
        data["pagination"],
        json!({
            "currentPage": 3,
            "totalPages": 3,
            "totalCount": 25,
            "hasNextPage": false,
            "hasPrevPage": true,
            "limit": 10
        })
    );

    // Newest created first: page 1 starts with the last one written.
    let first_page = app.client.get(&app.url("/api/sessions")).await.data();
    assert_eq!(titles(&first_page)[0], "Session 24");
    assert_eq!(first_page["pagination"]["hasNextPage"], true);
}

#[tokio::test]
async fn test_limit_is_clamped_and_junk_is_defaulted() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;
    publish_many(&app, &token, 3).await;

    let res = app.client.get(&app.url("/api/sessions?limit=1000")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["pagination"]["limit"], 50);

    let res = app
        .client
        .get(&app.url("/api/sessions?page=abc&limit=0"))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["pagination"]["currentPage"], 1);
    assert_eq!(res.data()["pagination"]["limit"], 10);

    let res = app
        .client
        .get(&app.url("/api/sessions?limit=99999999999999999999"))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["pagination"]["limit"], 50);
}

#[tokio::test]
async fn test_huge_page_numbers_return_empty_pages() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;
    publish_many(&app, &token, 3).await;

    let query = "page=18446744073709551615&limit=50";
    for (path, auth) in [
        ("/api/sessions", None),
        ("/api/sessions/search", None),
        ("/api/my-sessions", Some(token.as_str())),
    ] {
        let url = app.url(&format!("{path}?{query}"));
        let res = match auth {
            Some(token) => app.client.get_with_auth(&url, token).await,
            None => app.client.get(&url).await,
        };
        assert_eq!(res.status, 200, "{path}");
        let data = res.data();
        assert!(titles(&data).is_empty(), "{path}");
        assert_eq!(data["pagination"]["totalCount"], 3);
        assert_eq!(data["pagination"]["hasNextPage"], false);
        assert_eq!(data["pagination"]["hasPrevPage"], true);
    }
}

#[tokio::test]
async fn test_public_listing_hides_drafts_and_redacts_owner() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    app.create_session(&token, json!({ "title": "Secret draft" }), false)
        .await;
    app.create_session(&token, json!({ "title": "Shared", "content": "hi" }), true)
        .await;

    // Even the owner sees only published sessions here.
    let data = app
        .client
        .get_with_auth(&app.url("/api/sessions"), &token)
        .await
        .data();
    assert_eq!(titles(&data), vec!["Shared"]);

    let session = &data["sessions"][0];
    assert!(session.get("ownerId").is_none());
    assert_eq!(session["owner"], json!({ "email": "owner@example.com" }));
}

#[tokio::test]
async fn test_single_fetch_visibility() {
    let app = TestApp::new().await;
    let (owner, user) = app.create_user("owner@example.com", "password123").await;
    let (other, _) = app.create_user("other@example.com", "password123").await;

    let draft = app
        .create_session(&owner, json!({ "title": "Draft" }), false)
        .await;
    let draft_url = app.url(&format!("/api/sessions/{}", draft["id"].as_str().unwrap()));

    let res = app.client.get_with_auth(&draft_url, &other).await;
    assert_eq!(res.status, 403);
    assert_eq!(res.json()["message"], "Access denied to this session");

    let res = app.client.get(&draft_url).await;
    assert_eq!(res.status, 403);

    let res = app.client.get_with_auth(&draft_url, &owner).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["isOwner"], true);
    assert_eq!(res.data()["session"]["ownerId"], user["id"]);

    let published = app
        .create_session(&owner, json!({ "title": "Public", "content": "x" }), true)
        .await;
    let published_url = app.url(&format!(
        "/api/sessions/{}",
        published["id"].as_str().unwrap()
    ));

    let res = app.client.get_with_auth(&published_url, &other).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["isOwner"], false);
    let session = res.data()["session"].clone();
    assert!(session.get("ownerId").is_none());
    assert_eq!(session["owner"]["email"], "owner@example.com");

    // Ids are case-insensitive.
    let upper = published["id"].as_str().unwrap().to_uppercase();
    let res = app.client.get(&app.url(&format!("/api/sessions/{upper}"))).await;
    assert_eq!(res.status, 200);

    let res = app
        .client
        .get(&app.url("/api/sessions/507f1f77bcf86cd799439011"))
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_search_and_tag_filters() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    app.create_session(
        &token,
        json!({ "title": "Morning Breath", "content": "inhale", "tags": ["breath"] }),
        true,
    )
    .await;
    app.create_session(
        &token,
        json!({ "title": "Sleep", "content": "a deep BREATH before bed", "tags": ["sleep"] }),
        true,
    )
    .await;
    app.create_session(
        &token,
        json!({ "title": "100% focus", "content": "focus", "tags": ["focus"] }),
        true,
    )
    .await;

    let data = app
        .client
        .get(&app.url("/api/sessions?search=breath"))
        .await
        .data();
    assert_eq!(data["pagination"]["totalCount"], 2);

    // Wildcards in the term match literally.
    let data = app.client.get(&app.url("/api/sessions?search=%25")).await.data();
    assert_eq!(titles(&data), vec!["100% focus"]);

    let data = app
        .client
        .get(&app.url("/api/sessions?tags=sleep,focus"))
        .await
        .data();
    assert_eq!(data["pagination"]["totalCount"], 2);

    let data = app
        .client
        .get(&app.url("/api/sessions?tags=sleep&tags=breath"))
        .await
        .data();
    assert_eq!(data["pagination"]["totalCount"], 2);
}

#[tokio::test]
async fn test_advanced_search_sorting() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    for title in ["Bravo", "Alpha", "Charlie"] {
        app.create_session(&token, json!({ "title": title, "content": "x" }), true)
            .await;
    }

    let res = app
        .client
        .get(&app.url("/api/sessions/search?sortBy=title&sortOrder=asc"))
        .await;
    assert_eq!(res.status, 200);
    let data = res.data();
    assert_eq!(titles(&data), vec!["Alpha", "Bravo", "Charlie"]);
    assert_eq!(
        data["searchQuery"],
        json!({ "query": null, "tags": [], "sortBy": "title", "sortOrder": "asc" })
    );

    let data = app
        .client
        .get(&app.url("/api/sessions/search?q=a&sort_by=created_at"))
        .await
        .data();
    assert_eq!(titles(&data), vec!["Charlie", "Alpha", "Bravo"]);
    assert_eq!(data["searchQuery"]["query"], "a");
    assert_eq!(data["searchQuery"]["sortBy"], "createdAt");

    let res = app
        .client
        .get(&app.url("/api/sessions/search?sortBy=ownerId"))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_tag_aggregation_counts_published_only() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    for tags in [json!(["a", "b"]), json!(["a"]), json!(["b", "a"])] {
        app.create_session(
            &token,
            json!({ "title": "t", "content": "c", "tags": tags }),
            true,
        )
        .await;
    }
    app.create_session(&token, json!({ "title": "draft", "tags": ["a", "z"] }), false)
        .await;

    let data = app.client.get(&app.url("/api/sessions/tags")).await.data();
    assert_eq!(
        data,
        json!({
            "tags": [ { "tag": "a", "count": 3 }, { "tag": "b", "count": 2 } ],
            "totalUniqueTags": 2
        })
    );

    let data = app
        .client
        .get(&app.url("/api/sessions/tags?limit=1"))
        .await
        .data();
    assert_eq!(data["tags"], json!([{ "tag": "a", "count": 3 }]));

    let res = app
        .client
        .get(&app.url("/api/sessions/tags?limit=18446744073709551615"))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["totalUniqueTags"], 2);

    let res = app
        .client
        .get(&app.url("/api/sessions/tags?limit=99999999999999999999"))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["totalUniqueTags"], 2);
}

#[tokio::test]
async fn test_owner_listing_and_summary() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;
    let (other, _) = app.create_user("other@example.com", "password123").await;

    app.create_session(&token, json!({ "title": "One" }), false).await;
    app.create_session(&token, json!({ "title": "Two", "content": "x" }), true)
        .await;
    app.create_session(&token, json!({ "title": "Three" }), false).await;
    app.create_session(&other, json!({ "title": "Not mine" }), false)
        .await;

    let data = app
        .client
        .get_with_auth(&app.url("/api/my-sessions"), &token)
        .await
        .data();
    assert_eq!(titles(&data), vec!["Three", "Two", "One"]);
    assert_eq!(
        data["summary"],
        json!({ "total": 3, "draft": 2, "published": 1 })
    );
    assert!(data["sessions"][0]["ownerId"].is_string());

    let data = app
        .client
        .get_with_auth(&app.url("/api/my-sessions?status=draft"), &token)
        .await
        .data();
    assert_eq!(titles(&data), vec!["Three", "One"]);
    // The summary ignores the filter.
    assert_eq!(data["summary"]["total"], 3);

    let data = app
        .client
        .get_with_auth(&app.url("/api/my-sessions?status=bogus"), &token)
        .await
        .data();
    assert_eq!(data["pagination"]["totalCount"], 3);
}

#[tokio::test]
async fn test_owner_stats() {
    let app = TestApp::new().await;
    let (token, _) = app.create_user("owner@example.com", "password123").await;

    for i in 0..6 {
        app.create_session(
            &token,
            json!({ "title": format!("S{i}"), "content": "c", "tags": ["calm", format!("t{i}")] }),
            i % 2 == 0,
        )
        .await;
    }

    let res = app
        .client
        .get_with_auth(&app.url("/api/my-sessions/stats"), &token)
        .await;
    assert_eq!(res.status, 200);

    let data = res.data();
    assert_eq!(
        data["summary"],
        json!({ "total": 6, "draft": 3, "published": 3 })
    );

    let recent = data["recentSessions"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["title"], "S5");
    assert!(recent[0]["updatedAt"].is_string());
    assert!(recent[0].get("content").is_none());

    assert_eq!(data["mostUsedTags"][0], json!({ "tag": "calm", "count": 6 }));
    assert_eq!(data["mostUsedTags"].as_array().unwrap().len(), 7);
    assert_eq!(data["totalTags"], 7);
}
