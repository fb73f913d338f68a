//! # integration-tests
//!
//! Drives the full axum router in-process. Storage is the in-memory store;
//! the identity provider, text generator and mailer are local fakes that
//! record what they were asked to do.

use std::sync::{Arc, Mutex};

use api_adapters::{router, AppState, Ports, RouterOptions};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use domains::{
    CallerIdentity, CompletionRequest, CredentialVerifier, DomainError, IdentityProvider,
    Mailbox, Mailer, NewTrivia, OutboundEmail, Result, TextGenerator, Trivia, TriviaRepository,
};
use fake::faker::address::en::CityName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use secrecy::SecretString;
use serde_json::Value;
use services::InsightSettings;
use storage_adapters::MemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

pub const SIGNUP_PASSWORD: &str = "correct-horse";

pub const CANNED_REPORT: &str = "\
Here is what you asked for.
1. Housing & Rent:
- One-bedroom units downtown run high
- Shared houses are common near campus
2. Transportation:
- Frequent buses on the main corridors
7. Special Considerations:
- Plenty of plant-based restaurants
";

// ── Fakes ───────────────────────────────────────────────────────────────────

/// Opaque tokens handed out by the tests themselves.
#[derive(Default)]
pub struct TokenTable {
    issued: DashMap<String, CallerIdentity>,
}

impl TokenTable {
    pub fn issue(&self, subject_id: &str, email: Option<&str>) -> String {
        self.issue_until(subject_id, email, Utc::now() + Duration::hours(1))
    }

    pub fn issue_expired(&self, subject_id: &str) -> String {
        self.issue_until(subject_id, None, Utc::now() - Duration::minutes(5))
    }

    fn issue_until(
        &self,
        subject_id: &str,
        email: Option<&str>,
        expires_at: chrono::DateTime<Utc>,
    ) -> String {
        let token = format!("tok-{}", Uuid::new_v4().simple());
        self.issued.insert(
            token.clone(),
            CallerIdentity {
                subject_id: subject_id.to_string(),
                email: email.map(str::to_string),
                expires_at,
            },
        );
        token
    }
}

#[async_trait]
impl CredentialVerifier for TokenTable {
    async fn verify(&self, token: &str) -> Result<CallerIdentity> {
        self.issued
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DomainError::Unauthenticated("Invalid token.".into()))
    }
}

/// Identity provider that keeps accounts in memory.
#[derive(Default)]
pub struct FakeAccounts {
    by_email: DashMap<String, String>,
}

impl FakeAccounts {
    pub fn subject_for(&self, email: &str) -> Option<String> {
        self.by_email.get(email).map(|entry| entry.value().clone())
    }

    /// Registers an account without a local profile.
    pub fn provision(&self, email: &str) -> String {
        let subject = format!("uid-{}", Uuid::new_v4().simple());
        self.by_email.insert(email.to_string(), subject.clone());
        subject
    }
}

#[async_trait]
impl IdentityProvider for FakeAccounts {
    async fn create_account(&self, email: &str, _password: &SecretString) -> Result<String> {
        if self.by_email.contains_key(email) {
            return Err(DomainError::Conflict("Email already registered".into()));
        }
        Ok(self.provision(email))
    }
}

/// Returns the same report for every prompt and keeps the prompts.
pub struct ScriptedGenerator {
    reply: String,
    prompts: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<CompletionRequest> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.clone());
        }
        Ok(self.reply.clone())
    }
}

#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl Outbox {
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for Outbox {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        Ok(())
    }
}

// ── Application under test ──────────────────────────────────────────────────

/// Replaces individual ports before the router is assembled.
#[derive(Default)]
pub struct Overrides {
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub mailer: Option<Arc<dyn Mailer>>,
    /// Production error rendering: no raw messages for 5xx and no `error` field
    pub production: bool,
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: Arc<TokenTable>,
    pub accounts: Arc<FakeAccounts>,
    pub generator: Arc<ScriptedGenerator>,
    pub outbox: Arc<Outbox>,
}

/// A signed-up user with a live token.
#[derive(Debug, Clone)]
pub struct TestUser {
    /// Internal record id
    pub id: String,
    pub subject_id: String,
    pub email: String,
    pub name: String,
    pub token: String,
}

/// Status, content type and body text of a finished response.
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        if self.text.is_empty() {
            return Value::Null;
        }
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }
}

pub fn test_app() -> TestApp {
    TestApp::build(Overrides::default())
}

impl TestApp {
    pub fn build(overrides: Overrides) -> Self {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenTable::default());
        let accounts = Arc::new(FakeAccounts::default());
        let generator = Arc::new(ScriptedGenerator::replying(CANNED_REPORT));
        let outbox = Arc::new(Outbox::default());

        let ports = Ports {
            users: store.clone(),
            posts: store.clone(),
            trivia: store.clone(),
            verifier: tokens.clone(),
            identity: accounts.clone(),
            generator: overrides
                .generator
                .unwrap_or_else(|| generator.clone() as Arc<dyn TextGenerator>),
            mailer: overrides
                .mailer
                .unwrap_or_else(|| outbox.clone() as Arc<dyn Mailer>),
        };
        let sender = Mailbox {
            email: "noreply@wheninroam.app".into(),
            name: Some("When in Roam".into()),
        };
        let options = RouterOptions {
            expose_error_details: !overrides.production,
            ..RouterOptions::default()
        };
        let state = AppState::assemble(ports, InsightSettings::default(), sender, options);

        Self {
            router: router(state),
            store,
            tokens,
            accounts,
            generator,
            outbox,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    /// Sends a prebuilt request, for cases that need unusual headers.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        TestResponse {
            status,
            content_type,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.call(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.call(Method::DELETE, uri, token, None).await
    }

    /// Signs up a user with generated details and issues a token for them.
    pub async fn register(&self) -> TestUser {
        let name: String = Name().fake();
        let email = format!("{}.{}", Uuid::new_v4().simple(), SafeEmail().fake::<String>());
        let response = self
            .post(
                "/api/users/signup",
                None,
                serde_json::json!({ "email": email, "password": SIGNUP_PASSWORD, "name": name }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);

        let id = response.json()["user"]["id"]
            .as_str()
            .expect("user id")
            .to_string();
        let subject_id = self.accounts.subject_for(&email).expect("provider account");
        let token = self.tokens.issue(&subject_id, Some(&email));
        TestUser {
            id,
            subject_id,
            email,
            name,
            token,
        }
    }

    /// A valid token whose subject has no local profile.
    pub fn stranger_token(&self) -> String {
        let email: String = SafeEmail().fake();
        let subject = self.accounts.provision(&email);
        self.tokens.issue(&subject, Some(&email))
    }

    pub async fn seed_trivia(&self, count: usize) -> Vec<Trivia> {
        let mut seeded = Vec::with_capacity(count);
        for _ in 0..count {
            let record = Trivia::new(
                NewTrivia {
                    title: Sentence(2..5).fake(),
                    location: CityName().fake(),
                    description: Sentence(8..16).fake(),
                },
                Utc::now(),
            );
            let stored = TriviaRepository::insert(self.store.as_ref(), record)
                .await
                .expect("seed trivia");
            seeded.push(stored);
        }
        seeded
    }
}
