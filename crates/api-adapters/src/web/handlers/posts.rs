use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use domains::PostInput;
use serde_json::{json, Value};

use crate::web::error::ApiResult;
use crate::web::extract::{ApiJson, Caller};
use crate::web::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(input): ApiJson<PostInput>,
) -> ApiResult<impl IntoResponse> {
    let post = state.posts.create(&caller, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Post created successfully",
            "post": post,
        })),
    ))
}

pub async fn list_all(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let posts = state.posts.list_all().await?;
    Ok(Json(json!({ "success": true, "posts": posts })))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ApiResult<Json<Value>> {
    let posts = state.posts.list_mine(&caller).await?;
    Ok(Json(json!({ "success": true, "posts": posts })))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(post_id): Path<String>,
    ApiJson(input): ApiJson<PostInput>,
) -> ApiResult<Json<Value>> {
    let post = state.posts.update(&caller, &post_id, input).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Post updated successfully",
        "post": post,
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(post_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.posts.delete(&caller, &post_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Post deleted successfully",
    })))
}
