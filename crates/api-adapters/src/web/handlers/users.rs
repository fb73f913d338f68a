use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use domains::SignupRequest;
use serde_json::{json, Map, Value};

use crate::web::error::ApiResult;
use crate::web::extract::{ApiJson, Caller};
use crate::web::state::AppState;

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.users.signup(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User signed up successfully",
            "user": user,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ApiResult<Json<Value>> {
    let user = state.users.login(&caller).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "user": user,
    })))
}

pub async fn me(State(state): State<AppState>, Caller(caller): Caller) -> ApiResult<Json<Value>> {
    let user = state.users.current_user(&caller).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

/// Full profile by subject id.
pub async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = state.users.profile(&user_id).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(patch): ApiJson<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let user = state.users.update_profile(&caller, patch).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": user,
    })))
}

/// Reduced profile by record id. No credential required.
pub async fn mini_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let profile = state.users.mini_profile(&user_id).await?;
    Ok(Json(json!({ "success": true, "profile": profile })))
}
