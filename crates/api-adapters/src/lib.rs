//! # api-adapters
//!
//! The HTTP boundary. `metrics` is framework-neutral; the axum router, its
//! handlers and error mapping live in `web` behind the `web-axum` feature.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod web;

#[cfg(feature = "web-axum")]
pub use web::{
    error::ApiError,
    router,
    state::{AppState, Ports, RouterOptions},
};
