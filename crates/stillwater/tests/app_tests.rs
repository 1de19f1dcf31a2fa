use stillwater::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/api/health")).await;

    assert_eq!(res.status, 200);
    assert!(res.is_success());
    assert_eq!(res.data()["status"], "OK");
    assert!(res.data()["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/api/nowhere")).await;

    assert_eq!(res.status, 404);
    assert!(!res.is_success());
    assert_eq!(res.json()["message"], "Route not found");
    assert_eq!(res.code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/api-docs/openapi.json")).await;

    assert_eq!(res.status, 200);
    let doc = res.json();
    assert_eq!(doc["info"]["title"], "Stillwater API");
    assert!(doc["paths"]["/api/my-sessions/{id}/publish"].is_object());
}

#[tokio::test]
async fn test_request_id_header_outside_production() {
    let app = TestApp::new().await;

    let res = app.client.get(&app.url("/api/health")).await;

    assert!(res.headers.contains_key("x-request-id"));
}
