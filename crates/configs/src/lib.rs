//! # configs
//!
//! Layered application configuration: built-in defaults, then an optional
//! TOML file (`config/roam.toml`, or the path in `ROAM_CONFIG`), then
//! `ROAM__<SECTION>__<KEY>` environment variables. A `.env` file is read first.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_FILE: &str = "config/roam";
const ENV_PREFIX: &str = "ROAM";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory of a built frontend to serve for non-API paths
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. Unset means the in-memory store.
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub firebase_project_id: String,
    pub firebase_api_key: SecretString,
    pub identity_base_url: String,
    pub jwks_url: String,
    /// Trust the bearer token as the subject id. Debug builds only.
    pub dev_bypass: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            firebase_project_id: String::new(),
            firebase_api_key: SecretString::default(),
            identity_base_url: "https://identitytoolkit.googleapis.com".into(),
            jwks_url: "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com".into(),
            dev_bypass: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::default(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4".into(),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub from_address: String,
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::default(),
            base_url: "https://api.sendgrid.com".into(),
            from_address: "noreply@wheninroam.app".into(),
            from_name: "When in Roam".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub insights: InsightsConfig,
    pub email: EmailConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads `.env`, the optional config file and `ROAM__*` variables, then validates.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        let file = std::env::var("ROAM_CONFIG").unwrap_or_else(|_| DEFAULT_FILE.to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );
        Self::from_builder(builder)
    }

    /// Parses a TOML document on top of the defaults. No environment lookup.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if !(0.0..=2.0).contains(&self.insights.temperature) {
            return Err(ConfigError::Invalid(
                "insights.temperature must be between 0 and 2".into(),
            ));
        }
        if self.environment.is_production() && self.auth.dev_bypass {
            return Err(ConfigError::Invalid(
                "auth.dev_bypass cannot be enabled in production".into(),
            ));
        }
        Ok(())
    }
}
