//! # seed
//!
//! Loads trivia reference data from a JSON file into Postgres. Records whose
//! title and location already exist are skipped, so reruns are harmless.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use configs::AppConfig;
use domains::{NewTrivia, Trivia, TriviaRepository};
use secrecy::ExposeSecret;
use storage_adapters::PgStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seed")]
#[command(about = "Load trivia reference data into the roam database", long_about = None)]
struct Cli {
    /// JSON array of `{ title, location, description }` records
    #[arg(default_value = "data/trivia.json")]
    file: PathBuf,

    /// Parse and report without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let raw = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let records: Vec<NewTrivia> =
        serde_json::from_str(&raw).context("trivia file must be a JSON array of records")?;
    tracing::info!(count = records.len(), file = %cli.file.display(), "parsed trivia file");

    if cli.dry_run {
        for record in &records {
            tracing::info!(title = %record.title, location = %record.location, "would insert");
        }
        return Ok(());
    }

    let config = AppConfig::load().context("failed to load configuration")?;
    let url = config
        .database
        .url
        .as_ref()
        .context("database.url (ROAM__DATABASE__URL) must be set")?;
    let store = PgStore::connect(url.expose_secret(), config.database.max_connections)
        .await
        .context("failed to connect to Postgres")?;

    let mut existing: HashSet<(String, String)> = store
        .list_all()
        .await?
        .into_iter()
        .map(|t| (t.title, t.location))
        .collect();

    let (mut inserted, mut skipped) = (0usize, 0usize);
    for record in records {
        let key = (record.title.clone(), record.location.clone());
        if existing.contains(&key) {
            skipped += 1;
            continue;
        }
        store.insert(Trivia::new(record, Utc::now())).await?;
        existing.insert(key);
        inserted += 1;
    }

    tracing::info!(inserted, skipped, "trivia seeding finished");
    Ok(())
}
