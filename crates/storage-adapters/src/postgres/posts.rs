use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Post, PostRepository, PostWithAuthor, Result};
use once_cell::sync::Lazy;
use sqlx::{postgres::PgRow, Row};
use uuid::Uuid;

use super::users::{user_from_row, USER_COLUMNS};
use super::{map_db_error, PgStore};

const POST_COLUMNS: &str = "id, title, body, author_id, author_firebase_uid, created_at, updated_at";

/// `p.id AS p_id, ..., u.id AS u_id, ...` for the joined listing.
static JOINED_COLUMNS: Lazy<String> = Lazy::new(|| {
    let aliased = |table: &str, columns: &str| {
        columns
            .split(',')
            .map(str::trim)
            .map(|c| format!("{table}.{c} AS {table}_{c}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{}, {}", aliased("p", POST_COLUMNS), aliased("u", USER_COLUMNS))
});

fn post_from_row(row: &PgRow, prefix: &str) -> std::result::Result<Post, sqlx::Error> {
    let col = |name: &str| format!("{prefix}{name}");
    Ok(Post {
        id: row.try_get(col("id").as_str())?,
        title: row.try_get(col("title").as_str())?,
        body: row.try_get(col("body").as_str())?,
        author_id: row.try_get(col("author_id").as_str())?,
        author_firebase_uid: row.try_get(col("author_firebase_uid").as_str())?,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
    })
}

#[async_trait]
impl PostRepository for PgStore {
    /// The foreign key on `author_id` turns a dangling author into `NotFound`.
    async fn insert(&self, post: Post) -> Result<Post> {
        sqlx::query(
            "INSERT INTO posts (id, title, body, author_id, author_firebase_uid, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.author_id)
        .bind(&post.author_firebase_uid)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        row.map(|r| post_from_row(&r, ""))
            .transpose()
            .map_err(map_db_error)
    }

    async fn list_with_authors(&self, author_id: Option<Uuid>) -> Result<Vec<PostWithAuthor>> {
        let sql = format!(
            "SELECT {} FROM posts p JOIN users u ON u.id = p.author_id \
             WHERE ($1::uuid IS NULL OR p.author_id = $1) \
             ORDER BY p.created_at DESC, p.id DESC",
            *JOINED_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.iter()
            .map(|row| {
                Ok(PostWithAuthor {
                    post: post_from_row(row, "p_")?,
                    author: user_from_row(row, "u_")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(map_db_error)
    }

    async fn update_content(
        &self,
        id: Uuid,
        title: String,
        body: String,
        at: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        let sql = format!(
            "UPDATE posts SET title = $2, body = $3, updated_at = $4 WHERE id = $1 RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(title)
            .bind(body)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        row.map(|r| post_from_row(&r, ""))
            .transpose()
            .map_err(map_db_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(done.rows_affected() > 0)
    }
}
