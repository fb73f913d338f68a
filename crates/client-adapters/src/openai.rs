//! Chat Completions client.

use async_trait::async_trait;
use domains::{CompletionRequest, DomainError, Result, TextGenerator};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    /// One attempt; the first choice's content is the answer.
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let payload = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(DomainError::upstream)?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), model = %request.model, "completion response");
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::upstream(format!(
                "text generation failed with {status}: {detail}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(DomainError::upstream)?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DomainError::upstream("text generation returned no content"))
    }
}
