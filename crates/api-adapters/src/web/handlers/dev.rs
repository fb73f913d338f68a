//! Development helpers. Only compiled with `dev-routes`, never mounted in production.

use axum::Json;
use domains::DomainError;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::web::error::{ApiError, ApiResult};
use crate::web::extract::ApiJson;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    uid: String,
}

/// Echoes `uid` as a bearer token for the trusting verifier.
pub async fn generate_token(ApiJson(request): ApiJson<TokenRequest>) -> ApiResult<Json<Value>> {
    if request.uid.trim().is_empty() {
        return Err(ApiError(DomainError::invalid("uid is required")));
    }
    tracing::warn!(uid = %request.uid, "issued development token");
    Ok(Json(json!({ "success": true, "token": request.uid })))
}
