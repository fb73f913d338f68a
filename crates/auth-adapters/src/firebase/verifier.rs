use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::DateTime;
use domains::{CallerIdentity, CredentialVerifier, DomainError, Result};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

/// Keys older than this are refetched before use.
const KEY_TTL: Duration = Duration::from_secs(60 * 60);
/// An unknown `kid` only forces a refetch once the cached set is at least this old.
const MIN_REFRESH: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

struct CachedKeys {
    fetched_at: Instant,
    keys: HashMap<String, Jwk>,
}

impl CachedKeys {
    fn is_stale(&self) -> bool {
        self.fetched_at.elapsed() >= KEY_TTL
    }
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    exp: i64,
}

fn invalid_token() -> DomainError {
    DomainError::Unauthenticated("Invalid token.".into())
}

/// Verifies Firebase ID tokens (RS256) against Google's rotating public keys.
pub struct FirebaseVerifier {
    http: reqwest::Client,
    project_id: String,
    jwks_url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(http: reqwest::Client, project_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            http,
            project_id: project_id.into(),
            jwks_url: jwks_url.into(),
            cache: RwLock::new(None),
        }
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    async fn fetch_keys(&self) -> Result<CachedKeys> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(DomainError::upstream)?;

        let set: JwkSet = response.json().await.map_err(DomainError::upstream)?;
        let keys: HashMap<_, _> = set.keys.into_iter().map(|k| (k.kid.clone(), k)).collect();
        if keys.is_empty() {
            return Err(DomainError::upstream("JWK set contained no keys"));
        }

        tracing::debug!(count = keys.len(), "refreshed token signing keys");
        Ok(CachedKeys {
            fetched_at: Instant::now(),
            keys,
        })
    }

    async fn key_for(&self, kid: &str) -> Result<Jwk> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_stale() {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                    if cached.fetched_at.elapsed() < MIN_REFRESH {
                        return Err(invalid_token());
                    }
                }
            }
        }

        let fresh = self.fetch_keys().await?;
        let key = fresh.keys.get(kid).cloned();
        *self.cache.write().await = Some(fresh);
        key.ok_or_else(invalid_token)
    }
}

#[async_trait]
impl CredentialVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<CallerIdentity> {
        let header = decode_header(token).map_err(|_| invalid_token())?;
        if header.alg != Algorithm::RS256 {
            return Err(invalid_token());
        }
        let kid = header.kid.ok_or_else(invalid_token)?;

        let jwk = self.key_for(&kid).await?;
        if jwk.kty != "RSA" {
            return Err(invalid_token());
        }
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(DomainError::internal)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);

        let data = decode::<IdTokenClaims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => DomainError::Unauthenticated("Token has expired.".into()),
            _ => {
                tracing::debug!(error = %e, "rejected id token");
                invalid_token()
            }
        })?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(invalid_token());
        }
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or_else(invalid_token)?;

        Ok(CallerIdentity {
            subject_id: claims.sub,
            email: claims.email,
            expires_at,
        })
    }
}
