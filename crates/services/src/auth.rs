//! Bearer-credential resolution for inbound requests.

use std::sync::Arc;

use chrono::Utc;
use domains::{CallerIdentity, CredentialVerifier, DomainError, Result};

const BEARER_PREFIX: &str = "Bearer ";

pub struct Authenticator {
    verifier: Arc<dyn CredentialVerifier>,
}

impl Authenticator {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Resolves the value of an `Authorization` header into a caller identity.
    ///
    /// Every failure is `Unauthenticated`; nothing downstream runs without a caller.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<CallerIdentity> {
        let token = bearer_token(header)?;

        let identity = self.verifier.verify(token).await.map_err(|e| match e {
            DomainError::Unauthenticated(_) => e,
            other => {
                tracing::warn!(error = %other, "credential verification failed");
                DomainError::Unauthenticated("Invalid token.".into())
            }
        })?;

        if identity.is_expired_at(Utc::now()) {
            return Err(DomainError::Unauthenticated("Token has expired.".into()));
        }

        Ok(identity)
    }
}

fn bearer_token(header: Option<&str>) -> Result<&str> {
    let Some(rest) = header.and_then(|h| h.strip_prefix(BEARER_PREFIX)) else {
        return Err(DomainError::Unauthenticated(
            "Access denied. No token provided.".into(),
        ));
    };

    match rest.split(' ').next() {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(DomainError::Unauthenticated(
            "Access denied. Invalid token format.".into(),
        )),
    }
}
