//! # In-memory document store
//!
//! Backs every repository port with process-local maps. Used by the test
//! suites and by the binary when it is built without `db-postgres`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domains::{
    DomainError, Post, PostRepository, PostWithAuthor, ProfileUpdate, Result, Trivia,
    TriviaRepository, User, UserRepository,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Users plus the two unique indexes, always read and written together.
#[derive(Default)]
struct UserTable {
    by_id: HashMap<Uuid, User>,
    by_subject: HashMap<String, Uuid>,
    by_email: HashMap<String, Uuid>,
}

impl UserTable {
    fn by_subject(&self, subject_id: &str) -> Option<&User> {
        self.by_subject.get(subject_id).and_then(|id| self.by_id.get(id))
    }

    fn by_subject_mut(&mut self, subject_id: &str) -> Option<&mut User> {
        let id = *self.by_subject.get(subject_id)?;
        self.by_id.get_mut(&id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<UserTable>,
    posts: DashMap<Uuid, Post>,
    trivia: DashMap<Uuid, Trivia>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: User) -> Result<User> {
        let mut table = self.users.write().await;
        if table.by_email.contains_key(&user.email) {
            return Err(DomainError::Conflict("Email already registered".into()));
        }
        if table.by_subject.contains_key(&user.firebase_uid) {
            return Err(DomainError::Conflict("User already exists".into()));
        }

        table.by_email.insert(user.email.clone(), user.id);
        table.by_subject.insert(user.firebase_uid.clone(), user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_subject(&self, subject_id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.by_subject(subject_id).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let table = self.users.read().await;
        Ok(table
            .by_email
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn record_login(&self, subject_id: &str, at: DateTime<Utc>) -> Result<Option<User>> {
        let mut table = self.users.write().await;
        Ok(table.by_subject_mut(subject_id).map(|user| {
            user.last_login_at = Some(at);
            user.clone()
        }))
    }

    async fn apply_patch(
        &self,
        subject_id: &str,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let mut table = self.users.write().await;
        Ok(table.by_subject_mut(subject_id).map(|user| {
            update.apply_to(user, at);
            user.clone()
        }))
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, post: Post) -> Result<Post> {
        // Held across the write so the author cannot vanish in between.
        let users = self.users.read().await;
        if !users.by_id.contains_key(&post.author_id) {
            return Err(DomainError::not_found("User not found"));
        }
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.value().clone()))
    }

    async fn list_with_authors(&self, author_id: Option<Uuid>) -> Result<Vec<PostWithAuthor>> {
        let users = self.users.read().await;
        let mut listed: Vec<PostWithAuthor> = self
            .posts
            .iter()
            .filter(|entry| author_id.map_or(true, |id| entry.author_id == id))
            .filter_map(|entry| {
                let author = users.by_id.get(&entry.author_id)?.clone();
                Some(PostWithAuthor {
                    post: entry.value().clone(),
                    author,
                })
            })
            .collect();

        listed.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then_with(|| b.post.id.cmp(&a.post.id))
        });
        Ok(listed)
    }

    async fn update_content(
        &self,
        id: Uuid,
        title: String,
        body: String,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        Ok(self.posts.get_mut(&id).map(|mut post| {
            post.title = title;
            post.body = body;
            post.updated_at = at;
            post.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.posts.remove(&id).is_some())
    }
}

#[async_trait]
impl TriviaRepository for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Trivia>> {
        let mut all: Vec<Trivia> = self.trivia.iter().map(|t| t.value().clone()).collect();
        all.sort_by_key(|t| t.id);
        Ok(all)
    }

    async fn sample(&self, count: usize) -> Result<Vec<Trivia>> {
        let all: Vec<Trivia> = self.trivia.iter().map(|t| t.value().clone()).collect();
        let amount = count.min(all.len());
        let picked = rand::seq::index::sample(&mut rand::rng(), all.len(), amount);
        Ok(picked.into_iter().map(|i| all[i].clone()).collect())
    }

    async fn insert(&self, trivia: Trivia) -> Result<Trivia> {
        self.trivia.insert(trivia.id, trivia.clone());
        Ok(trivia)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use domains::{NewTrivia, PostContent};

    fn user(subject: &str, email: &str) -> User {
        User::new(subject.into(), email.into(), "Kai".into(), Utc::now())
    }

    fn post_by(author: &User, title: &str) -> Post {
        Post::new(
            PostContent {
                title: title.into(),
                body: "body".into(),
            },
            author,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn email_and_subject_are_unique() {
        let store = MemoryStore::new();
        UserRepository::insert(&store, user("uid-1", "a@x.com")).await.unwrap();

        let dup_email = UserRepository::insert(&store, user("uid-2", "a@x.com")).await;
        assert!(matches!(dup_email, Err(DomainError::Conflict(_))));

        let dup_subject = UserRepository::insert(&store, user("uid-1", "b@x.com")).await;
        assert!(matches!(dup_subject, Err(DomainError::Conflict(_))));

        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dangling_author_is_rejected() {
        let store = MemoryStore::new();
        let ghost = user("ghost", "g@x.com");
        let err = PostRepository::insert(&store, post_by(&ghost, "t")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_skips_orphans() {
        let store = MemoryStore::new();
        let author = UserRepository::insert(&store, user("uid-1", "a@x.com")).await.unwrap();

        let first = PostRepository::insert(&store, post_by(&author, "first")).await.unwrap();
        let second = PostRepository::insert(&store, post_by(&author, "second")).await.unwrap();

        // Simulates a post whose author record has since disappeared.
        let orphan = post_by(&user("gone", "gone@x.com"), "orphan");
        store.posts.insert(orphan.id, orphan);

        let listed = store.list_with_authors(None).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|p| p.post.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_eq!(listed[0].post.id, second.id);
        assert_eq!(listed[1].post.id, first.id);
    }

    #[tokio::test]
    async fn patch_and_login_update_in_place() {
        let store = MemoryStore::new();
        UserRepository::insert(&store, user("uid-1", "a@x.com")).await.unwrap();

        let update = ProfileUpdate {
            occupation: Some("Chef".into()),
            ..Default::default()
        };
        let patched = store.apply_patch("uid-1", &update, Utc::now()).await.unwrap().unwrap();
        assert_eq!(patched.occupation.as_deref(), Some("Chef"));

        let logged_in = store.record_login("uid-1", Utc::now()).await.unwrap().unwrap();
        assert!(logged_in.last_login_at.is_some());

        assert!(store.apply_patch("nobody", &update, Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sample_is_distinct_and_bounded() {
        let store = MemoryStore::new();
        for n in 0..6 {
            TriviaRepository::insert(
                &store,
                Trivia::new(
                    NewTrivia {
                        title: format!("Fact {n}"),
                        location: "Calgary".into(),
                        description: "Stampede city".into(),
                    },
                    Utc::now(),
                ),
            )
            .await
            .unwrap();
        }

        for count in [3, 4] {
            let picked = store.sample(count).await.unwrap();
            let ids: HashSet<_> = picked.iter().map(|t| t.id).collect();
            assert_eq!(picked.len(), count);
            assert_eq!(ids.len(), count);
        }
        assert_eq!(store.sample(10).await.unwrap().len(), 6);
    }
}
