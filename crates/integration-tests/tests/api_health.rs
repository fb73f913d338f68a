use axum::http::StatusCode;
use integration_tests::test_app;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "success": true, "status": "ok" }));
}

#[tokio::test]
async fn unknown_routes_get_a_json_not_found() {
    let app = test_app();
    let response = app.get("/api/nothing/here", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.json(),
        json!({ "success": false, "message": "Route not found" })
    );
}

#[tokio::test]
async fn metrics_count_requests_by_route_template() {
    let app = test_app();
    let user = app.register().await;
    app.get("/api/users/me", Some(&user.token)).await;
    app.get("/api/users/me", None).await;

    let response = app.get("/metrics", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .content_type
        .as_deref()
        .unwrap_or_default()
        .starts_with("application/openmetrics-text"));

    let text = response.text;
    assert!(text.contains("roam_http_requests_total"), "{text}");
    assert!(text.contains(r#"route="/api/users/me""#), "{text}");
    assert!(text.contains(r#"status="401""#), "{text}");
    assert!(text.contains(r#"route="/api/users/signup""#), "{text}");
    assert!(text.contains("roam_http_request_duration_seconds"), "{text}");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(
            axum::http::Request::get("/health")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
