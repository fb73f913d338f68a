//! Request extractors that reject with the JSON error envelope.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use domains::{CallerIdentity, DomainError};

use super::error::ApiError;

/// `axum::Json` with `ApiError` as rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// The identity resolved by `require_auth`.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerIdentity);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| {
                ApiError(DomainError::Unauthenticated(
                    "Access denied. No token provided.".into(),
                ))
            })
    }
}
