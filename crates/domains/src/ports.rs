//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    CallerIdentity, CompletionRequest, OutboundEmail, Post, PostWithAuthor, ProfileUpdate,
    Trivia, User,
};

/// Persistence contract for user profiles.
///
/// Implementations enforce subject-id and email uniqueness themselves;
/// `insert` returns `Conflict` when either is already taken.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> Result<User>;
    async fn find_by_subject(&self, subject_id: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn record_login(&self, subject_id: &str, at: DateTime<Utc>) -> Result<Option<User>>;
    async fn apply_patch(
        &self,
        subject_id: &str,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>>;
}

/// Persistence contract for posts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Fails with `NotFound` when `post.author_id` does not resolve to a user.
    async fn insert(&self, post: Post) -> Result<Post>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;
    /// Newest first. Posts whose author no longer exists are left out.
    async fn list_with_authors(&self, author_id: Option<Uuid>) -> Result<Vec<PostWithAuthor>>;
    async fn update_content(
        &self,
        id: Uuid,
        title: String,
        body: String,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Read-mostly trivia reference data.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TriviaRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Trivia>>;
    /// Up to `count` distinct records chosen uniformly at random.
    async fn sample(&self, count: usize) -> Result<Vec<Trivia>>;
    async fn insert(&self, trivia: Trivia) -> Result<Trivia>;
}

/// Turns a bearer credential into a caller identity.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CallerIdentity>;
}

/// Account provisioning at the external identity provider.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the new subject id. `Conflict` when the provider already knows the email.
    async fn create_account(&self, email: &str, password: &SecretString) -> Result<String>;
}

/// Synchronous prompt-in, text-out generation.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Transactional email delivery.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}
