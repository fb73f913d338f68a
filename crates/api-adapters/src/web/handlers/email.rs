use axum::{extract::State, Json};
use domains::EmailRequest;
use serde_json::{json, Value};

use crate::web::error::ApiResult;
use crate::web::extract::{ApiJson, Caller};
use crate::web::state::AppState;

pub async fn send(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(request): ApiJson<EmailRequest>,
) -> ApiResult<Json<Value>> {
    state.notifications.send(&caller, request).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Email sent successfully",
    })))
}
