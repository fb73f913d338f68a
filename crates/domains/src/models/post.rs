use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Budget, Cleanliness, DietaryRestriction, GuestComfort, SleepSchedule, User};
use crate::error::{DomainError, Result};

/// A roommate-wanted post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    /// Internal record id of the owning user
    pub author_id: Uuid,
    /// Copy of the owner's subject id, compared on update/delete
    pub author_firebase_uid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(content: PostContent, author: &User, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: content.title,
            body: content.body,
            author_id: author.id,
            author_firebase_uid: author.firebase_uid.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, subject_id: &str) -> bool {
        self.author_firebase_uid == subject_id
    }
}

/// Title and body as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Validated post content: trimmed, non-empty title and non-empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub body: String,
}

impl TryFrom<PostInput> for PostContent {
    type Error = DomainError;

    fn try_from(input: PostInput) -> Result<Self> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(DomainError::invalid("Title is required"));
        }
        if input.body.trim().is_empty() {
            return Err(DomainError::invalid("Body is required"));
        }
        Ok(Self {
            title: title.to_string(),
            body: input.body,
        })
    }
}

/// A post joined with its (still existing) author.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: User,
}

/// Author attached to a freshly created post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedPost {
    #[serde(flatten)]
    pub post: Post,
    pub author: AuthorSummary,
}

// ── Listing projection ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListing {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorProjection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorProjection {
    pub id: Uuid,
    pub name: String,
    pub photo: Option<String>,
    pub preferences: AuthorPreferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorPreferences {
    pub dietary: Vec<DietaryRestriction>,
    pub lifestyle: Lifestyle,
    pub budget: Budget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifestyle {
    pub smokes: bool,
    pub drinks: bool,
    pub prefers_pets: bool,
    pub cleanliness: Cleanliness,
    pub sleep_schedule: SleepSchedule,
    pub guest_comfort: GuestComfort,
}

impl From<PostWithAuthor> for PostListing {
    fn from(PostWithAuthor { post, author }: PostWithAuthor) -> Self {
        let prefs = author.preferences;
        let name = if author.name.trim().is_empty() {
            "Unknown User".to_string()
        } else {
            author.name
        };

        Self {
            id: post.id,
            title: post.title,
            body: post.body,
            created_at: post.created_at,
            author: AuthorProjection {
                id: author.id,
                name,
                photo: author.photo,
                preferences: AuthorPreferences {
                    dietary: prefs.dietary_restrictions,
                    lifestyle: Lifestyle {
                        smokes: prefs.smokes,
                        drinks: prefs.drinks,
                        prefers_pets: prefs.prefers_pets,
                        cleanliness: prefs.cleanliness,
                        sleep_schedule: prefs.sleep_schedule,
                        guest_comfort: prefs.guest_comfort,
                    },
                    budget: prefs.budget,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed_and_required() {
        let content = PostContent::try_from(PostInput {
            title: "  Room in Kitsilano ".into(),
            body: "Sunny, two blocks from the beach".into(),
        })
        .unwrap();
        assert_eq!(content.title, "Room in Kitsilano");

        let err = PostContent::try_from(PostInput {
            title: "   ".into(),
            body: "x".into(),
        })
        .unwrap_err();
        assert_eq!(err, DomainError::invalid("Title is required"));

        assert!(PostContent::try_from(PostInput {
            title: "t".into(),
            body: "".into(),
        })
        .is_err());
    }

    #[test]
    fn listing_projects_author_preferences() {
        let now = Utc::now();
        let author = User::new("uid-7".into(), "b@x.com".into(), "".into(), now);
        let post = Post::new(
            PostContent {
                title: "t".into(),
                body: "b".into(),
            },
            &author,
            now,
        );
        assert!(post.is_owned_by("uid-7"));

        let listing = PostListing::from(PostWithAuthor { post, author });
        assert_eq!(listing.author.name, "Unknown User");
        assert_eq!(listing.author.preferences.lifestyle.sleep_schedule, SleepSchedule::Flexible);
        assert_eq!(listing.author.preferences.dietary, vec![DietaryRestriction::None]);
    }
}
