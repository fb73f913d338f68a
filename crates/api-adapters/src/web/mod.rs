//! # axum surface
//!
//! Route table, layers and state. Everything under `/api` except signup,
//! mini-profile and random trivia requires a bearer credential.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    extract::Request,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use self::handlers::{email, health, insights, posts, trivia, users};
use self::state::AppState;

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/users/login", post(users::login))
        .route("/api/users/me", get(users::me))
        .route("/api/users/profile", put(users::update_profile))
        .route("/api/users/profile/{user_id}", get(users::profile))
        .route("/api/posts", get(posts::list_all).post(posts::create))
        .route("/api/posts/my-posts", get(posts::list_mine))
        .route("/api/posts/{post_id}", put(posts::update).delete(posts::delete))
        .route("/api/trivia", get(trivia::list_all))
        .route("/api/insights/analyze", post(insights::analyze))
        .route("/api/email/send", post(email::send))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    let public = Router::new()
        .route("/api/users/signup", post(users::signup))
        .route("/api/users/mini-profile/{user_id}", get(users::mini_profile))
        .route("/api/trivia/random", get(trivia::random))
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics));

    let mut app = public.merge(protected);

    #[cfg(feature = "dev-routes")]
    if state.options.dev_routes {
        tracing::warn!("development routes mounted");
        app = app.route(
            "/api/dev/generate-token",
            post(handlers::dev::generate_token),
        );
    }

    app = match &state.options.static_dir {
        Some(dir) => app.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => app.fallback(health::not_found),
    };

    let request_layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri().path(),
                    request_id,
                    subject = tracing::field::Empty,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(middleware::cors_policy());

    app.layer(from_fn_with_state(state.clone(), error::expose_error_details))
        .layer(from_fn_with_state(state.clone(), middleware::track_requests))
        .layer(request_layers)
        .with_state(state)
}
