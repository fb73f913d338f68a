use axum::{extract::State, Json};
use domains::{InsightReport, InsightRequest};

use super::Success;
use crate::web::error::ApiResult;
use crate::web::extract::{ApiJson, Caller};
use crate::web::state::AppState;

pub async fn analyze(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(request): ApiJson<InsightRequest>,
) -> ApiResult<Json<Success<InsightReport>>> {
    let report = state.insights.analyze(&caller, request).await?;
    Ok(Json(Success::new(report)))
}
