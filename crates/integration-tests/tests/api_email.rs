use std::sync::Arc;

use axum::http::StatusCode;
use domains::{DomainError, MockMailer};
use integration_tests::{test_app, Overrides, TestApp};
use serde_json::json;

#[tokio::test]
async fn send_delivers_a_plain_text_notification() {
    let app = test_app();
    let sender = app.register().await;
    let recipient = app.register().await;

    let response = app
        .post(
            "/api/email/send",
            Some(&sender.token),
            json!({
                "recipientId": recipient.id,
                "subject": "Your room post",
                "message": "Is it still available?"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(
        response.json(),
        json!({ "success": true, "message": "Email sent successfully" })
    );

    let sent = app.outbox.sent();
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email.to, recipient.email);
    assert_eq!(email.reply_to, sender.email);
    assert_eq!(email.from.email, "noreply@wheninroam.app");
    assert_eq!(email.from.name.as_deref(), Some("When in Roam"));
    assert_eq!(email.subject, "Your room post");
    assert_eq!(
        email.text,
        format!(
            "From: {}\n\nSubject: Your room post\n\nMessage: Is it still available?",
            sender.email
        )
    );
}

#[tokio::test]
async fn send_validates_the_recipient() {
    let app = test_app();
    let sender = app.register().await;

    for body in [
        json!({ "subject": "s", "message": "m" }),
        json!({ "recipientId": "abc", "subject": "s", "message": "m" }),
    ] {
        let response = app.post("/api/email/send", Some(&sender.token), body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json()["message"], "Invalid recipient ID");
    }

    let response = app
        .post(
            "/api/email/send",
            Some(&sender.token),
            json!({
                "recipientId": "0190b6a0-0000-7000-8000-000000000000",
                "subject": "s",
                "message": "m"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "Recipient not found");
    assert!(app.outbox.sent().is_empty());
}

#[tokio::test]
async fn send_from_a_caller_without_a_profile_is_not_found() {
    let app = test_app();
    let recipient = app.register().await;
    let token = app.stranger_token();

    let response = app
        .post(
            "/api/email/send",
            Some(&token),
            json!({ "recipientId": recipient.id, "subject": "s", "message": "m" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "Sender not found");
}

#[tokio::test]
async fn delivery_failure_is_a_server_error_with_details_outside_production() {
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .times(1)
        .returning(|_| Err(DomainError::Upstream("403 from provider".into())));

    let app = TestApp::build(Overrides {
        mailer: Some(Arc::new(mailer)),
        ..Overrides::default()
    });
    let sender = app.register().await;
    let recipient = app.register().await;

    let response = app
        .post(
            "/api/email/send",
            Some(&sender.token),
            json!({ "recipientId": recipient.id, "subject": "s", "message": "m" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "upstream service error: 403 from provider");
}
