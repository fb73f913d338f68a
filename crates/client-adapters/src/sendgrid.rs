//! SendGrid v3 mail send.

use async_trait::async_trait;
use domains::{DomainError, Mailbox, Mailer, OutboundEmail, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: &'a Mailbox,
    reply_to: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

impl<'a> From<&'a OutboundEmail> for MailSend<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        Self {
            personalizations: [Personalization {
                to: [Address { email: &email.to }],
            }],
            from: &email.from,
            reply_to: Address {
                email: &email.reply_to,
            },
            subject: &email.subject,
            content: [Content {
                kind: "text/plain",
                value: &email.text,
            }],
        }
    }
}

pub struct SendGridMailer {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl SendGridMailer {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&MailSend::from(email))
            .send()
            .await
            .map_err(DomainError::upstream)?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(status = status.as_u16(), "email accepted for delivery");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(DomainError::upstream(format!(
            "email delivery failed with {status}: {detail}"
        )))
    }
}
