use chrono::{DateTime, Utc};
use serde::Serialize;

/// The verified principal behind a request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerIdentity {
    /// Identity-provider subject id
    pub subject_id: String,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl CallerIdentity {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
