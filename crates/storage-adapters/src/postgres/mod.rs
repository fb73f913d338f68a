//! # PostgreSQL store
//!
//! Implements the repository ports on top of `sqlx`. Preference documents live
//! in a JSONB column and are decoded with their schema defaults on every read.

mod posts;
mod trivia;
mod users;

use domains::DomainError;
use sqlx::postgres::{PgPool, PgPoolOptions};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Opens a pool and makes sure the schema exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::info!("database schema ready");
        Ok(())
    }
}

/// Converts driver errors into domain errors. Constraint violations keep their meaning.
pub(crate) fn map_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let message = match db.constraint() {
                Some(c) if c.contains("email") => "Email already registered",
                _ => "User already exists",
            };
            return DomainError::Conflict(message.into());
        }
        if db.is_foreign_key_violation() {
            return DomainError::not_found("User not found");
        }
        if db.is_check_violation() {
            return DomainError::invalid("Title and body are required");
        }
    }
    tracing::error!(error = %err, "database error");
    DomainError::internal(err)
}
