use axum::http::StatusCode;
use integration_tests::{test_app, TestApp, TestUser};
use serde_json::{json, Value};

async fn create_post(app: &TestApp, user: &TestUser, title: &str) -> Value {
    let response = app
        .post(
            "/api/posts",
            Some(&user.token),
            json!({ "title": title, "body": "Sunny room, five minutes from the subway." }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
    response.json()["post"].clone()
}

#[tokio::test]
async fn create_attaches_the_author() {
    let app = test_app();
    let user = app.register().await;

    let response = app
        .post(
            "/api/posts",
            Some(&user.token),
            json!({ "title": "  Room in the Annex  ", "body": "Available June 1." }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let body = response.json();
    assert_eq!(body["message"], "Post created successfully");
    let post = &body["post"];
    assert_eq!(post["title"], "Room in the Annex");
    assert_eq!(post["authorId"], user.id.as_str());
    assert_eq!(post["authorFirebaseUid"], user.subject_id.as_str());
    assert_eq!(
        post["author"],
        json!({ "id": user.id, "name": user.name, "email": user.email })
    );
}

#[tokio::test]
async fn create_requires_title_and_body() {
    let app = test_app();
    let user = app.register().await;

    let response = app
        .post("/api/posts", Some(&user.token), json!({ "title": "   ", "body": "x" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Title is required");

    let response = app
        .post("/api/posts", Some(&user.token), json!({ "title": "Room" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Body is required");
}

#[tokio::test]
async fn create_without_a_profile_is_not_found() {
    let app = test_app();
    let token = app.stranger_token();
    let response = app
        .post("/api/posts", Some(&token), json!({ "title": "Room", "body": "Cheap" }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "User not found");
}

#[tokio::test]
async fn listing_is_newest_first_with_author_projection() {
    let app = test_app();
    let alice = app.register().await;
    let bob = app.register().await;

    create_post(&app, &alice, "first").await;
    create_post(&app, &bob, "second").await;
    create_post(&app, &alice, "third").await;

    let response = app.get("/api/posts", Some(&bob.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let posts = response.json()["posts"].as_array().unwrap().clone();
    let titles: Vec<&str> = posts.iter().map(|p| p["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["third", "second", "first"]);

    let author = &posts[0]["author"];
    assert_eq!(author["id"], alice.id.as_str());
    assert_eq!(author["name"], alice.name.as_str());
    assert_eq!(author["preferences"]["dietary"], json!(["None"]));
    assert_eq!(author["preferences"]["lifestyle"]["cleanliness"], "moderate");
    assert_eq!(author["preferences"]["budget"], json!({ "min": 0, "max": 0 }));
    assert!(posts[0].get("authorFirebaseUid").is_none());
}

#[tokio::test]
async fn my_posts_only_lists_the_callers_posts() {
    let app = test_app();
    let alice = app.register().await;
    let bob = app.register().await;

    create_post(&app, &alice, "alice one").await;
    create_post(&app, &bob, "bob one").await;
    create_post(&app, &alice, "alice two").await;

    let body = app.get("/api/posts/my-posts", Some(&alice.token)).await.json();
    let titles: Vec<&str> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["alice two", "alice one"]);
}

#[tokio::test]
async fn only_the_author_may_update_or_delete() {
    let app = test_app();
    let owner = app.register().await;
    let other = app.register().await;
    let post = create_post(&app, &owner, "mine").await;
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let response = app
        .put(&uri, Some(&other.token), json!({ "title": "stolen", "body": "x" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.json()["message"],
        "Unauthorized - can only edit your own posts"
    );

    let response = app.delete(&uri, Some(&other.token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.json()["message"],
        "Unauthorized - You can only delete your own posts"
    );

    let response = app
        .put(&uri, Some(&owner.token), json!({ "title": "edited", "body": "new body" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["message"], "Post updated successfully");
    assert_eq!(body["post"]["title"], "edited");
    assert_eq!(body["post"]["body"], "new body");

    let response = app.delete(&uri, Some(&owner.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Post deleted successfully");

    let response = app.delete(&uri, Some(&owner.token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "Post not found");
}

#[tokio::test]
async fn malformed_and_unknown_post_ids() {
    let app = test_app();
    let user = app.register().await;

    let response = app.delete("/api/posts/12345", Some(&user.token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["message"], "Invalid post ID format");

    let response = app
        .put(
            "/api/posts/0190b6a0-0000-7000-8000-000000000000",
            Some(&user.token),
            json!({ "title": "t", "body": "b" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "Post not found");
}
