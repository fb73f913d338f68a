use async_trait::async_trait;
use domains::{Result, Trivia, TriviaRepository};
use sqlx::{postgres::PgRow, Row};

use super::{map_db_error, PgStore};

const TRIVIA_COLUMNS: &str = "id, title, location, description, created_at, updated_at";

fn trivia_from_row(row: &PgRow) -> std::result::Result<Trivia, sqlx::Error> {
    Ok(Trivia {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        location: row.try_get("location")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl PgStore {
    async fn fetch_trivia(&self, sql: &str, limit: Option<i64>) -> Result<Vec<Trivia>> {
        let mut query = sqlx::query(sql);
        if let Some(limit) = limit {
            query = query.bind(limit);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(map_db_error)?;
        rows.iter()
            .map(trivia_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(map_db_error)
    }
}

#[async_trait]
impl TriviaRepository for PgStore {
    async fn list_all(&self) -> Result<Vec<Trivia>> {
        let sql = format!("SELECT {TRIVIA_COLUMNS} FROM trivia ORDER BY id");
        self.fetch_trivia(&sql, None).await
    }

    async fn sample(&self, count: usize) -> Result<Vec<Trivia>> {
        let sql = format!("SELECT {TRIVIA_COLUMNS} FROM trivia ORDER BY random() LIMIT $1");
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        self.fetch_trivia(&sql, Some(limit)).await
    }

    async fn insert(&self, trivia: Trivia) -> Result<Trivia> {
        sqlx::query(
            "INSERT INTO trivia (id, title, location, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(trivia.id)
        .bind(&trivia.title)
        .bind(&trivia.location)
        .bind(&trivia.description)
        .bind(trivia.created_at)
        .bind(trivia.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(trivia)
    }
}
