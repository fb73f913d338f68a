use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Preferences, ProfileUpdate, Result, User, UserRepository};
use sqlx::{postgres::PgRow, types::Json, Row};
use uuid::Uuid;

use super::{map_db_error, PgStore};

pub(crate) const USER_COLUMNS: &str = "id, firebase_uid, email, name, photo, current_city, \
    nationality, occupation, preferences, created_at, updated_at, last_login_at";

/// Maps a row back to a `User`. `prefix` selects aliased columns in joins.
pub(crate) fn user_from_row(row: &PgRow, prefix: &str) -> std::result::Result<User, sqlx::Error> {
    let col = |name: &str| format!("{prefix}{name}");
    let Json(preferences): Json<Preferences> = row.try_get(col("preferences").as_str())?;

    Ok(User {
        id: row.try_get(col("id").as_str())?,
        firebase_uid: row.try_get(col("firebase_uid").as_str())?,
        email: row.try_get(col("email").as_str())?,
        name: row.try_get(col("name").as_str())?,
        photo: row.try_get(col("photo").as_str())?,
        current_city: row.try_get(col("current_city").as_str())?,
        nationality: row.try_get(col("nationality").as_str())?,
        occupation: row.try_get(col("occupation").as_str())?,
        preferences,
        created_at: row.try_get(col("created_at").as_str())?,
        updated_at: row.try_get(col("updated_at").as_str())?,
        last_login_at: row.try_get(col("last_login_at").as_str())?,
    })
}

impl PgStore {
    async fn fetch_user(&self, filter: &str, value: impl ToString) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter} = $1");
        let row = sqlx::query(&sql)
            .bind(value.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(|r| user_from_row(&r, ""))
            .transpose()
            .map_err(map_db_error)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    /// Uniqueness of subject id and email is decided by the unique indexes.
    async fn insert(&self, user: User) -> Result<User> {
        sqlx::query(
            "INSERT INTO users (id, firebase_uid, email, name, photo, current_city, nationality, \
             occupation, preferences, created_at, updated_at, last_login_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(user.id)
        .bind(&user.firebase_uid)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.photo)
        .bind(&user.current_city)
        .bind(&user.nationality)
        .bind(&user.occupation)
        .bind(Json(&user.preferences))
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(user)
    }

    async fn find_by_subject(&self, subject_id: &str) -> Result<Option<User>> {
        self.fetch_user("firebase_uid", subject_id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        row.map(|r| user_from_row(&r, ""))
            .transpose()
            .map_err(map_db_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_user("email", email).await
    }

    async fn record_login(&self, subject_id: &str, at: DateTime<Utc>) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET last_login_at = $2 WHERE firebase_uid = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(subject_id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        row.map(|r| user_from_row(&r, ""))
            .transpose()
            .map_err(map_db_error)
    }

    /// Read-modify-write under a row lock. Concurrent patches are last-write-wins.
    async fn apply_patch(
        &self,
        subject_id: &str,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE firebase_uid = $1 FOR UPDATE");
        let Some(row) = sqlx::query(&sql)
            .bind(subject_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?
        else {
            return Ok(None);
        };

        let mut user = user_from_row(&row, "").map_err(map_db_error)?;
        update.apply_to(&mut user, at);

        sqlx::query(
            "UPDATE users SET name = $2, photo = $3, current_city = $4, nationality = $5, \
             occupation = $6, preferences = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.photo)
        .bind(&user.current_city)
        .bind(&user.nationality)
        .bind(&user.occupation)
        .bind(Json(&user.preferences))
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(Some(user))
    }
}
