use async_trait::async_trait;
use domains::{DomainError, IdentityProvider, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Maps Identity Toolkit error codes (`EMAIL_EXISTS`, `WEAK_PASSWORD : ...`) to domain errors.
fn map_provider_error(message: &str) -> DomainError {
    let code = message.split(':').next().unwrap_or_default().trim();
    match code {
        "EMAIL_EXISTS" => DomainError::Conflict("Email already registered".into()),
        "INVALID_EMAIL" | "MISSING_EMAIL" => DomainError::invalid("Invalid email address"),
        "WEAK_PASSWORD" | "MISSING_PASSWORD" => {
            DomainError::invalid("Password should be at least 6 characters")
        }
        _ => DomainError::upstream(format!("identity provider rejected signup: {message}")),
    }
}

/// Creates email/password accounts through the Identity Toolkit REST API.
pub struct FirebaseAccounts {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl FirebaseAccounts {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAccounts {
    async fn create_account(&self, email: &str, password: &SecretString) -> Result<String> {
        let url = format!("{}/v1/accounts:signUp", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&json!({
                "email": email,
                "password": password.expose_secret(),
                "returnSecureToken": false,
            }))
            .send()
            .await
            .map_err(DomainError::upstream)?;

        let status = response.status();
        if status.is_success() {
            let body: SignUpResponse = response.json().await.map_err(DomainError::upstream)?;
            tracing::info!(subject_id = %body.local_id, "identity account created");
            return Ok(body.local_id);
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Err(map_provider_error(&body.error.message)),
            Err(_) => Err(DomainError::upstream(format!(
                "identity provider returned {status}"
            ))),
        }
    }
}
