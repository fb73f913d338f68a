//! City insight reports generated from a user's profile.

mod parser;
mod prompt;

use std::sync::Arc;

use chrono::Utc;
use domains::{
    CallerIdentity, CompletionRequest, DomainError, InsightOverview, InsightReport,
    InsightRequest, Insights, Result, TextGenerator, UserRepository,
};

/// Model parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".into(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

pub struct InsightService {
    users: Arc<dyn UserRepository>,
    generator: Arc<dyn TextGenerator>,
    settings: InsightSettings,
}

impl InsightService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        generator: Arc<dyn TextGenerator>,
        settings: InsightSettings,
    ) -> Self {
        Self {
            users,
            generator,
            settings,
        }
    }

    /// One upstream attempt; missing sections in the reply are not an error.
    #[tracing::instrument(skip_all, fields(subject = %caller.subject_id, city = %request.city))]
    pub async fn analyze(
        &self,
        caller: &CallerIdentity,
        request: InsightRequest,
    ) -> Result<InsightReport> {
        let city = request.city.trim();
        let province = request.province.trim();
        if city.is_empty() || province.is_empty() {
            return Err(DomainError::invalid("City and province are required"));
        }

        let user = self
            .users
            .find_by_subject(&caller.subject_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))?;

        let completion = CompletionRequest {
            model: self.settings.model.clone(),
            system: prompt::SYSTEM_PROMPT.to_string(),
            prompt: prompt::build_prompt(city, province, &user, request.additional.as_deref()),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let raw = self.generator.complete(&completion).await.map_err(|e| {
            tracing::error!(error = %e, "text generation failed");
            match e {
                DomainError::Upstream(_) => e,
                other => DomainError::upstream(other),
            }
        })?;

        let sections = parser::parse_sections(&raw);
        tracing::debug!(sections = sections.len(), "parsed insight response");

        Ok(InsightReport {
            city: city.to_string(),
            province: province.to_string(),
            last_updated: Utc::now(),
            insights: Insights {
                overview: InsightOverview {
                    city: city.to_string(),
                    province: province.to_string(),
                    budget_range: user.preferences.budget.summary(),
                },
                sections,
            },
        })
    }
}
