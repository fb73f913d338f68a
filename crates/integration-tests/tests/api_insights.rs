use std::sync::Arc;

use axum::http::StatusCode;
use domains::{DomainError, MockTextGenerator};
use integration_tests::{test_app, Overrides, TestApp};
use serde_json::json;

#[tokio::test]
async fn analyze_returns_parsed_sections_for_the_callers_profile() {
    let app = test_app();
    let user = app.register().await;
    app.put(
        "/api/users/profile",
        Some(&user.token),
        json!({
            "dietaryRestrictions": ["Vegan"],
            "budget": { "min": 900, "max": 1400 },
            "occupation": "Software Developer"
        }),
    )
    .await;

    let response = app
        .post(
            "/api/insights/analyze",
            Some(&user.token),
            json!({ "city": "Toronto", "province": "Ontario", "additional": "near a climbing gym" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);

    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["city"], "Toronto");
    assert_eq!(body["province"], "Ontario");
    assert!(body["lastUpdated"].is_string());
    assert_eq!(
        body["insights"]["overview"],
        json!({ "city": "Toronto", "province": "Ontario", "budgetRange": "$900 - $1400" })
    );

    let sections = &body["insights"]["sections"];
    assert_eq!(
        sections["housing_rent"],
        json!({
            "title": "Housing & Rent",
            "content": [
                "One-bedroom units downtown run high",
                "Shared houses are common near campus"
            ]
        })
    );
    assert_eq!(sections["transportation"]["content"].as_array().unwrap().len(), 1);
    assert_eq!(
        sections["special_considerations"]["content"],
        json!(["Plenty of plant-based restaurants"])
    );
    assert!(sections.get("cost_of_living").is_none());

    let prompts = app.generator.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0].prompt;
    assert!(prompt.contains("living in Toronto, Ontario, Canada"));
    assert!(prompt.contains("- Dietary Restrictions: Vegan"));
    assert!(prompt.contains("- Budget Range: $900 - $1400"));
    assert!(prompt.contains("near a climbing gym"));
    assert_eq!(prompts[0].model, "gpt-4");
}

#[tokio::test]
async fn analyze_requires_city_and_province() {
    let app = test_app();
    let user = app.register().await;

    for body in [json!({ "city": "Toronto" }), json!({ "city": "", "province": "Ontario" })] {
        let response = app
            .post("/api/insights/analyze", Some(&user.token), body)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json()["message"], "City and province are required");
    }
    assert!(app.generator.prompts().is_empty());
}

#[tokio::test]
async fn analyze_without_a_profile_is_not_found() {
    let app = test_app();
    let token = app.stranger_token();
    let response = app
        .post(
            "/api/insights/analyze",
            Some(&token),
            json!({ "city": "Calgary", "province": "Alberta" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "User not found");
}

#[tokio::test]
async fn generation_failure_is_a_server_error() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_complete()
        .times(1)
        .returning(|_| Err(DomainError::Upstream("429 rate limited".into())));

    let app = TestApp::build(Overrides {
        generator: Some(Arc::new(generator)),
        production: true,
        ..Overrides::default()
    });
    let user = app.register().await;

    let response = app
        .post(
            "/api/insights/analyze",
            Some(&user.token),
            json!({ "city": "Montreal", "province": "Quebec" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "success": false, "message": "Internal server error" })
    );
}

#[tokio::test]
async fn an_unstructured_reply_yields_no_sections() {
    let mut generator = MockTextGenerator::new();
    generator
        .expect_complete()
        .returning(|_| Ok("Toronto is a great city. Enjoy!".into()));

    let app = TestApp::build(Overrides {
        generator: Some(Arc::new(generator)),
        ..Overrides::default()
    });
    let user = app.register().await;

    let body = app
        .post(
            "/api/insights/analyze",
            Some(&user.token),
            json!({ "city": "Toronto", "province": "Ontario" }),
        )
        .await
        .json();
    assert_eq!(body["success"], true);
    assert_eq!(body["insights"]["sections"], json!({}));
    assert_eq!(body["insights"]["overview"]["budgetRange"], "$0 - $0");
}
