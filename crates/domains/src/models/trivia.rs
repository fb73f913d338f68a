use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A read-only fact about a place, seeded out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trivia {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seed record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrivia {
    pub title: String,
    pub location: String,
    pub description: String,
}

impl Trivia {
    pub fn new(seed: NewTrivia, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: seed.title,
            location: seed.location,
            description: seed.description,
            created_at: now,
            updated_at: now,
        }
    }
}
