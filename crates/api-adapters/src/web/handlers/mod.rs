//! HTTP handlers. Each one unpacks the request, calls one service operation
//! and wraps the result in the `{ "success": true, ... }` envelope.

pub mod email;
pub mod health;
pub mod insights;
pub mod posts;
pub mod trivia;
pub mod users;

#[cfg(feature = "dev-routes")]
pub mod dev;

use serde::Serialize;

/// `{ "success": true, ...payload }` for payloads that are already a JSON object.
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    payload: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(payload: T) -> Self {
        Self {
            success: true,
            payload,
        }
    }
}
