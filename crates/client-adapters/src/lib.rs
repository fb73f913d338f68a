//! # client-adapters
//!
//! Outbound HTTP clients for the third-party services behind `TextGenerator`
//! and `Mailer`. Each adapter turns transport and status failures into
//! `DomainError::Upstream` and never retries.

pub mod openai;
pub mod sendgrid;

pub use openai::OpenAiClient;
pub use sendgrid::SendGridMailer;

/// Builds the shared HTTP client used by every outbound adapter.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("roam/", env!("CARGO_PKG_VERSION")))
        .build()
}
