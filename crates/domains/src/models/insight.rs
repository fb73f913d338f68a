use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for the city insight report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    /// Free-text notes appended to the special considerations section
    #[serde(default)]
    pub additional: Option<String>,
}

/// A single synchronous prompt for the text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightSection {
    pub title: String,
    pub content: Vec<String>,
}

/// Parsed sections keyed by normalized heading. Any key may be missing.
pub type InsightSections = BTreeMap<String, InsightSection>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub city: String,
    pub province: String,
    pub last_updated: DateTime<Utc>,
    pub insights: Insights,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub overview: InsightOverview,
    pub sections: InsightSections,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightOverview {
    pub city: String,
    pub province: String,
    pub budget_range: String,
}
