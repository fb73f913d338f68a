//! Post operations with author-ownership checks.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    parse_record_id, AuthorSummary, CallerIdentity, CreatedPost, DomainError, Post, PostContent,
    PostInput, PostListing, PostRepository, Result, UserRepository,
};
use uuid::Uuid;

const INVALID_POST_ID: &str = "Invalid post ID format";

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    #[tracing::instrument(skip_all, fields(subject = %caller.subject_id))]
    pub async fn create(&self, caller: &CallerIdentity, input: PostInput) -> Result<CreatedPost> {
        let content = PostContent::try_from(input)?;
        let author = self
            .users
            .find_by_subject(&caller.subject_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        let post = self.posts.insert(Post::new(content, &author, Utc::now())).await?;
        tracing::info!(post_id = %post.id, "post created");

        Ok(CreatedPost {
            post,
            author: AuthorSummary {
                id: author.id,
                name: author.name,
                email: author.email,
            },
        })
    }

    pub async fn list_all(&self) -> Result<Vec<PostListing>> {
        let posts = self.posts.list_with_authors(None).await?;
        Ok(posts.into_iter().map(PostListing::from).collect())
    }

    pub async fn list_mine(&self, caller: &CallerIdentity) -> Result<Vec<PostListing>> {
        let author = self
            .users
            .find_by_subject(&caller.subject_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;
        let posts = self.posts.list_with_authors(Some(author.id)).await?;
        Ok(posts.into_iter().map(PostListing::from).collect())
    }

    #[tracing::instrument(skip(self, caller, input), fields(subject = %caller.subject_id))]
    pub async fn update(
        &self,
        caller: &CallerIdentity,
        post_id: &str,
        input: PostInput,
    ) -> Result<Post> {
        let id = self
            .owned_post(caller, post_id, "Unauthorized - can only edit your own posts")
            .await?;
        let content = PostContent::try_from(input)?;

        self.posts
            .update_content(id, content.title, content.body, Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found("Post not found"))
    }

    #[tracing::instrument(skip(self, caller), fields(subject = %caller.subject_id))]
    pub async fn delete(&self, caller: &CallerIdentity, post_id: &str) -> Result<()> {
        let id = self
            .owned_post(caller, post_id, "Unauthorized - You can only delete your own posts")
            .await?;

        if !self.posts.delete(id).await? {
            return Err(DomainError::not_found("Post not found"));
        }
        tracing::info!(post_id = %id, "post deleted");
        Ok(())
    }

    /// Identifier, existence and ownership checks shared by update and delete.
    /// Ownership compares the caller's subject id with the post's denormalized copy.
    async fn owned_post(
        &self,
        caller: &CallerIdentity,
        post_id: &str,
        forbidden: &str,
    ) -> Result<Uuid> {
        let id = parse_record_id(post_id, INVALID_POST_ID)?;
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post not found"))?;

        if !post.is_owned_by(&caller.subject_id) {
            tracing::warn!(post_id = %id, "ownership check failed");
            return Err(DomainError::Forbidden(forbidden.to_string()));
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domains::{MockPostRepository, MockUserRepository, PostWithAuthor, User};

    fn caller(subject: &str) -> CallerIdentity {
        CallerIdentity {
            subject_id: subject.into(),
            email: None,
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    fn user(subject: &str) -> User {
        User::new(subject.into(), format!("{subject}@x.com"), "Sam".into(), Utc::now())
    }

    fn post_by(author: &User) -> Post {
        Post::new(
            PostContent {
                title: "Room".into(),
                body: "Near the park".into(),
            },
            author,
            Utc::now(),
        )
    }

    fn input(title: &str, body: &str) -> PostInput {
        PostInput {
            title: title.into(),
            body: body.into(),
        }
    }

    #[tokio::test]
    async fn create_denormalizes_author_subject() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_subject()
            .returning(|subject| Ok(Some(user(subject))));
        let mut posts = MockPostRepository::new();
        posts
            .expect_insert()
            .withf(|post| post.author_firebase_uid == "uid-1" && post.title == "Room")
            .returning(|post| Ok(post));

        let svc = PostService::new(Arc::new(posts), Arc::new(users));
        let created = svc.create(&caller("uid-1"), input(" Room ", "b")).await.unwrap();
        assert_eq!(created.author.name, "Sam");
        assert_eq!(created.author.email, "uid-1@x.com");
    }

    #[tokio::test]
    async fn create_without_profile_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_subject().returning(|_| Ok(None));
        let mut posts = MockPostRepository::new();
        posts.expect_insert().never();

        let svc = PostService::new(Arc::new(posts), Arc::new(users));
        let err = svc.create(&caller("ghost"), input("t", "b")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn foreign_caller_cannot_update_or_delete() {
        let owner = user("owner");
        let post = post_by(&owner);
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(post.clone())));
        posts.expect_update_content().never();
        posts.expect_delete().never();

        let svc = PostService::new(Arc::new(posts), Arc::new(MockUserRepository::new()));
        let id = Uuid::now_v7().to_string();

        let err = svc
            .update(&caller("intruder"), &id, input("x", "y"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = svc.delete(&caller("intruder"), &id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn malformed_post_id_is_invalid_argument() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().never();
        let svc = PostService::new(Arc::new(posts), Arc::new(MockUserRepository::new()));

        assert_eq!(
            svc.delete(&caller("uid-1"), "not-an-id").await.unwrap_err(),
            DomainError::invalid(INVALID_POST_ID)
        );
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let mut posts = MockPostRepository::new();
        posts.expect_find_by_id().returning(|_| Ok(None));
        let svc = PostService::new(Arc::new(posts), Arc::new(MockUserRepository::new()));

        let err = svc
            .update(&caller("uid-1"), &Uuid::now_v7().to_string(), input("t", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn owner_can_update() {
        let owner = user("owner");
        let post = post_by(&owner);
        let stored = post.clone();
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        posts
            .expect_update_content()
            .returning(move |_, title, body, at| {
                Ok(Some(Post {
                    title,
                    body,
                    updated_at: at,
                    ..post.clone()
                }))
            });

        let svc = PostService::new(Arc::new(posts), Arc::new(MockUserRepository::new()));
        let updated = svc
            .update(&caller("owner"), &Uuid::now_v7().to_string(), input("New", "Body"))
            .await
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.body, "Body");
    }

    #[tokio::test]
    async fn listing_filters_by_caller_record() {
        let me = user("uid-1");
        let my_id = me.id;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_subject()
            .returning(move |_| Ok(Some(me.clone())));
        let mut posts = MockPostRepository::new();
        posts
            .expect_list_with_authors()
            .withf(move |filter| *filter == Some(my_id))
            .returning(|_| Ok(Vec::<PostWithAuthor>::new()));

        let svc = PostService::new(Arc::new(posts), Arc::new(users));
        assert!(svc.list_mine(&caller("uid-1")).await.unwrap().is_empty());
    }
}
