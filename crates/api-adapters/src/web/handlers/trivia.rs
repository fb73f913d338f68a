use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::web::error::ApiResult;
use crate::web::state::AppState;

/// Three or four random facts.
pub async fn random(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let data = state.trivia.sample().await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

pub async fn list_all(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let data = state.trivia.list_all().await?;
    Ok(Json(json!({ "success": true, "data": data })))
}
