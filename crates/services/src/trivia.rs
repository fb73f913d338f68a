use std::sync::Arc;

use domains::{DomainError, Result, Trivia, TriviaRepository};
use rand::RngExt;

pub struct TriviaService {
    trivia: Arc<dyn TriviaRepository>,
}

impl TriviaService {
    pub fn new(trivia: Arc<dyn TriviaRepository>) -> Self {
        Self { trivia }
    }

    pub async fn list_all(&self) -> Result<Vec<Trivia>> {
        self.trivia.list_all().await
    }

    /// Three or four distinct records, the count decided by a fair coin flip.
    pub async fn sample(&self) -> Result<Vec<Trivia>> {
        let count = if rand::rng().random_bool(0.5) { 3 } else { 4 };
        let picked = self.trivia.sample(count).await?;
        if picked.is_empty() {
            return Err(DomainError::not_found("No trivia found"));
        }
        Ok(picked)
    }
}
