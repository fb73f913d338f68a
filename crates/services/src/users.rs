//! User profile operations: signup, login, profile reads and updates.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    parse_record_id, CallerIdentity, DomainError, IdentityProvider, LoginSummary, MiniProfile,
    ProfilePatch, Result, SignupRequest, User, UserRepository, UserView,
};
use secrecy::ExposeSecret;

const USER_NOT_FOUND: &str = "User not found";

pub struct UserService {
    users: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { users, identity }
    }

    /// Provisions a provider account, then the local profile linked to it.
    ///
    /// The email pre-check only avoids a provider round-trip; the store's own
    /// uniqueness constraint is what decides `Conflict`.
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<UserView> {
        let email = request.email.trim().to_string();
        let name = request.name.trim().to_string();
        if email.is_empty() || name.is_empty() || request.password.expose_secret().is_empty() {
            return Err(DomainError::invalid("All fields are required"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("User already exists".into()));
        }

        let subject_id = self
            .identity
            .create_account(&email, &request.password)
            .await?;

        let user = User::new(subject_id, email, name, Utc::now());
        let created = self.users.insert(user).await.inspect_err(|e| {
            tracing::warn!(error = %e, "provider account created but local profile insert failed");
        })?;

        tracing::info!(user_id = %created.id, "user signed up");
        Ok(UserView::public(created))
    }

    #[tracing::instrument(skip_all, fields(subject = %caller.subject_id))]
    pub async fn login(&self, caller: &CallerIdentity) -> Result<LoginSummary> {
        let user = self
            .users
            .record_login(&caller.subject_id, Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found("User not found in database"))?;
        Ok(LoginSummary::from(&user))
    }

    pub async fn current_user(&self, caller: &CallerIdentity) -> Result<UserView> {
        self.users
            .find_by_subject(&caller.subject_id)
            .await?
            .map(UserView::public)
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))
    }

    /// Full profile by subject id.
    pub async fn profile(&self, subject_id: &str) -> Result<UserView> {
        self.users
            .find_by_subject(subject_id)
            .await?
            .map(UserView::full)
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))
    }

    /// Reduced profile by internal record id. A malformed id cannot match a record.
    pub async fn mini_profile(&self, record_id: &str) -> Result<MiniProfile> {
        let id = parse_record_id(record_id, USER_NOT_FOUND)
            .map_err(|_| DomainError::not_found(USER_NOT_FOUND))?;
        self.users
            .find_by_id(id)
            .await?
            .map(MiniProfile::from)
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))
    }

    /// Partial update of the caller's own profile. Last write wins.
    #[tracing::instrument(skip_all, fields(subject = %caller.subject_id))]
    pub async fn update_profile(
        &self,
        caller: &CallerIdentity,
        document: serde_json::Map<String, serde_json::Value>,
    ) -> Result<UserView> {
        let update = ProfilePatch::from_document(document)?.validate()?;
        self.users
            .apply_patch(&caller.subject_id, &update, Utc::now())
            .await?
            .map(UserView::full)
            .ok_or_else(|| DomainError::not_found(USER_NOT_FOUND))
    }
}
