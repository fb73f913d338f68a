//! # ApiError
//!
//! Converts `DomainError` into the JSON error envelope
//! `{ "success": false, "message": ..., "error"?: ... }`.
//!
//! The response built here is always the production-safe one. When details
//! are enabled, `expose_error_details` re-renders it from the original error
//! that travels in the response extensions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Request, State,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domains::DomainError;
use serde_json::json;
use thiserror::Error;

use super::state::AppState;

const GENERIC_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

/// The unredacted error, attached to every error response.
#[derive(Debug, Clone)]
struct ErrorDetail(DomainError);

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Upstream(_) | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), error = %self.0, "request failed");
            GENERIC_SERVER_ERROR.to_string()
        } else {
            tracing::debug!(kind = self.0.kind(), error = %self.0, "request rejected");
            self.0.to_string()
        };

        let mut response = (status, Json(json!({ "success": false, "message": message })))
            .into_response();
        response.extensions_mut().insert(ErrorDetail(self.0));
        response
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::invalid(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(DomainError::invalid(rejection.body_text()))
    }
}

/// Outside production, error responses carry the raw message and an `error` field.
pub async fn expose_error_details(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(ErrorDetail(err)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    if !state.options.expose_error_details {
        return response;
    }

    let message = err.to_string();
    (
        response.status(),
        Json(json!({ "success": false, "message": message, "error": message })),
    )
        .into_response()
}
