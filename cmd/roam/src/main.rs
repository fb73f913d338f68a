//! # roam
//!
//! The entry point that assembles the server from configuration and
//! compile-time features.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState, Ports, RouterOptions};
use client_adapters::{OpenAiClient, SendGridMailer};
use configs::{AppConfig, LogFormat, LoggingConfig};
use domains::{
    CredentialVerifier, IdentityProvider, Mailbox, Mailer, PostRepository, TextGenerator,
    TriviaRepository, UserRepository,
};
use services::InsightSettings;
use storage_adapters::MemoryStore;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(feature = "db-postgres")]
use secrecy::ExposeSecret;
#[cfg(feature = "db-postgres")]
use storage_adapters::PgStore;

#[cfg(feature = "auth-jwt")]
use auth_adapters::{FirebaseAccounts, FirebaseVerifier};

#[cfg(feature = "dev-bypass")]
use auth_adapters::{LocalAccounts, TrustingVerifier};

type Stores = (
    Arc<dyn UserRepository>,
    Arc<dyn PostRepository>,
    Arc<dyn TriviaRepository>,
);

type Identity = (Arc<dyn CredentialVerifier>, Arc<dyn IdentityProvider>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let http = client_adapters::http_client().context("failed to build HTTP client")?;

    // 1. Storage
    let (users, posts, trivia) = storage(&config).await?;

    // 2. Identity
    let (verifier, identity) = identity(&config, http.clone())?;

    // 3. Outbound services
    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiClient::new(
        http.clone(),
        &config.insights.base_url,
        config.insights.api_key.clone(),
    ));
    let mailer: Arc<dyn Mailer> = Arc::new(SendGridMailer::new(
        http,
        &config.email.base_url,
        config.email.api_key.clone(),
    ));

    // 4. Application state and router
    let production = config.environment.is_production();
    let options = RouterOptions {
        expose_error_details: !production,
        dev_routes: !production && config.auth.dev_bypass,
        static_dir: config.server.static_dir.as_ref().map(PathBuf::from),
    };
    let state = AppState::assemble(
        Ports {
            users,
            posts,
            trivia,
            verifier,
            identity,
            generator,
            mailer,
        },
        InsightSettings {
            model: config.insights.model.clone(),
            temperature: config.insights.temperature,
            max_tokens: config.insights.max_tokens,
        },
        Mailbox {
            email: config.email.from_address.clone(),
            name: Some(config.email.from_name.clone()),
        },
        options,
    );

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(%address, environment = ?config.environment, "roam listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("roam stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn storage(config: &AppConfig) -> anyhow::Result<Stores> {
    #[cfg(feature = "db-postgres")]
    if let Some(url) = &config.database.url {
        let store = Arc::new(
            PgStore::connect(url.expose_secret(), config.database.max_connections)
                .await
                .context("failed to connect to Postgres")?,
        );
        tracing::info!("using Postgres storage");
        return Ok(split(store));
    }

    if config.environment.is_production() {
        anyhow::bail!("database.url is required in production");
    }
    tracing::warn!("no database configured, data is kept in memory and lost on restart");
    Ok(split(Arc::new(MemoryStore::new())))
}

fn split<S>(store: Arc<S>) -> Stores
where
    S: UserRepository + PostRepository + TriviaRepository + 'static,
{
    let users: Arc<dyn UserRepository> = store.clone();
    let posts: Arc<dyn PostRepository> = store.clone();
    let trivia: Arc<dyn TriviaRepository> = store;
    (users, posts, trivia)
}

#[cfg(feature = "dev-bypass")]
fn identity(config: &AppConfig, http: reqwest::Client) -> anyhow::Result<Identity> {
    if config.auth.dev_bypass {
        tracing::warn!("auth bypass enabled, bearer tokens are trusted as subject ids");
        let verifier: Arc<dyn CredentialVerifier> = Arc::new(TrustingVerifier);
        let accounts: Arc<dyn IdentityProvider> = Arc::new(LocalAccounts::new());
        return Ok((verifier, accounts));
    }
    firebase_identity(config, http)
}

#[cfg(not(feature = "dev-bypass"))]
fn identity(config: &AppConfig, http: reqwest::Client) -> anyhow::Result<Identity> {
    if config.auth.dev_bypass {
        tracing::warn!("auth.dev_bypass is set but this build has no dev-bypass support");
    }
    firebase_identity(config, http)
}

#[cfg(feature = "auth-jwt")]
fn firebase_identity(config: &AppConfig, http: reqwest::Client) -> anyhow::Result<Identity> {
    if config.auth.firebase_project_id.is_empty() {
        anyhow::bail!("auth.firebase_project_id is required");
    }
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(FirebaseVerifier::new(
        http.clone(),
        &config.auth.firebase_project_id,
        &config.auth.jwks_url,
    ));
    let accounts: Arc<dyn IdentityProvider> = Arc::new(FirebaseAccounts::new(
        http,
        &config.auth.identity_base_url,
        config.auth.firebase_api_key.clone(),
    ));
    Ok((verifier, accounts))
}

#[cfg(not(feature = "auth-jwt"))]
fn firebase_identity(_config: &AppConfig, _http: reqwest::Client) -> anyhow::Result<Identity> {
    anyhow::bail!("no credential verifier compiled in, enable `auth-jwt` or `dev-bypass`")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "auth-jwt")]
    #[test]
    fn firebase_identity_needs_a_project_id() {
        let mut config = AppConfig::default();
        let err = identity(&config, reqwest::Client::new()).err().unwrap();
        assert_eq!(err.to_string(), "auth.firebase_project_id is required");

        config.auth.firebase_project_id = "roam-test".into();
        assert!(identity(&config, reqwest::Client::new()).is_ok());
    }

    #[cfg(not(feature = "auth-jwt"))]
    #[test]
    fn without_a_verifier_feature_startup_fails() {
        let mut config = AppConfig::default();
        config.auth.firebase_project_id = "roam-test".into();
        let err = identity(&config, reqwest::Client::new()).err().unwrap();
        assert!(err.to_string().contains("no credential verifier compiled in"));
    }

    #[cfg(feature = "dev-bypass")]
    #[test]
    fn dev_bypass_wins_over_firebase() {
        let mut config = AppConfig::default();
        config.auth.dev_bypass = true;
        assert!(identity(&config, reqwest::Client::new()).is_ok());
    }
}
