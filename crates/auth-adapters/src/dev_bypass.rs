//! Local-development credentials. The bearer token *is* the subject id.

#[cfg(not(debug_assertions))]
compile_error!("the `dev-bypass` feature must not be enabled in release builds");

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use domains::{CallerIdentity, CredentialVerifier, DomainError, IdentityProvider, Result};
use secrecy::SecretString;
use uuid::Uuid;

/// Accepts any non-empty token and treats it as the subject id.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrustingVerifier;

#[async_trait]
impl CredentialVerifier for TrustingVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity> {
        if token.is_empty() {
            return Err(DomainError::Unauthenticated("Invalid token.".into()));
        }
        tracing::debug!(subject_id = token, "dev bypass: trusting bearer token");
        Ok(CallerIdentity {
            subject_id: token.to_string(),
            email: None,
            expires_at: Utc::now() + Duration::hours(1),
        })
    }
}

/// Hands out `local-<uuid>` subject ids and remembers which emails it has seen.
#[derive(Default)]
pub struct LocalAccounts {
    emails: DashMap<String, String>,
}

impl LocalAccounts {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for LocalAccounts {
    async fn create_account(&self, email: &str, _password: &SecretString) -> Result<String> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(_) => {
                Err(DomainError::Conflict("Email already registered".into()))
            }
            Entry::Vacant(slot) => {
                let subject_id = format!("local-{}", Uuid::now_v7().simple());
                slot.insert(subject_id.clone());
                Ok(subject_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_becomes_subject_id() {
        let identity = TrustingVerifier.verify("uid-42").await.unwrap();
        assert_eq!(identity.subject_id, "uid-42");
        assert!(identity.email.is_none());
        assert!(!identity.is_expired_at(Utc::now()));
    }

    #[tokio::test]
    async fn empty_token_is_rejected() {
        assert!(matches!(
            TrustingVerifier.verify("").await,
            Err(DomainError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn local_accounts_reject_reused_email() {
        let accounts = LocalAccounts::new();
        let password = SecretString::from("hunter22");

        let first = accounts.create_account("a@x.com", &password).await.unwrap();
        assert!(first.starts_with("local-"));

        let again = accounts.create_account("a@x.com", &password).await;
        assert_eq!(again, Err(DomainError::Conflict("Email already registered".into())));
    }
}
