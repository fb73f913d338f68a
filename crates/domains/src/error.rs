//! # DomainError
//!
//! Centralized error handling for the roam services.
//! Maps domain-specific failures to the classes the HTTP boundary understands.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input, identifier format or enum violation
    #[error("{0}")]
    InvalidArgument(String),

    /// Missing, invalid or expired credential
    #[error("{0}")]
    Unauthenticated(String),

    /// Caller does not own the resource
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found (e.g. User, Post)
    #[error("{0}")]
    NotFound(String),

    /// Resource already exists (e.g. duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// An external collaborator failed (identity provider, email, text generation)
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// Infrastructure failure (e.g. DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Self::Upstream(err.to_string())
    }

    /// Stable label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Upstream(_) => "upstream",
            Self::Internal(_) => "internal",
        }
    }
}

/// A specialized Result type for roam logic.
pub type Result<T> = std::result::Result<T, DomainError>;
