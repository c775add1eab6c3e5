//! # Application Configuration
//!
//! This module defines the configuration structure for `finbot-server` and the
//! logic for loading it from an optional `config.yml` file and environment
//! variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use finbot::{
    constants::{
        DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_AI_API_URL, DEFAULT_AI_MODEL, DEFAULT_AI_TIMEOUT,
        DEFAULT_DB_FILE, DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_SESSIONS, DEFAULT_MIN_CONNECTIONS,
    },
    PoolConfig, ResponseStrategy,
};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("placeholder pattern is valid")
});

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// Connection pool bounds. Overridable with `FINBOT_POOL__MAX_CONNECTIONS` and friends.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PoolSettings {
    pub min_connections: usize,
    pub max_connections: usize,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT.as_secs(),
        }
    }
}

impl PoolSettings {
    pub fn to_pool_config(&self) -> PoolConfig {
        PoolConfig {
            min_connections: self.min_connections,
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// The OpenAI-compatible chat completions endpoint. Loaded from `AI_API_URL`.
    #[serde(default = "default_ai_api_url")]
    pub ai_api_url: String,
    /// Loaded from `AI_API_KEY`. Blank means no `Authorization` header.
    #[serde(default)]
    pub ai_api_key: Option<String>,
    /// Loaded from `AI_MODEL`.
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
    /// Loaded from `AI_TIMEOUT_SECS`.
    #[serde(default = "default_ai_timeout_secs")]
    pub ai_timeout_secs: u64,
    /// `natural` or `literal`. Loaded from `RESPONSE_STRATEGY`.
    #[serde(default)]
    pub response_strategy: ResponseStrategy,
    #[serde(default)]
    pub pool: PoolSettings,
    /// Conversation sessions kept before the least recently used is dropped.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Allowed browser origins. A trailing `*` matches any suffix, e.g. `http://localhost:*`.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_port() -> u16 {
    5000
}

fn default_db_url() -> String {
    DEFAULT_DB_FILE.to_string()
}

fn default_ai_api_url() -> String {
    DEFAULT_AI_API_URL.to_string()
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

fn default_ai_timeout_secs() -> u64 {
    DEFAULT_AI_TIMEOUT.as_secs()
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:*".to_string(),
        "http://127.0.0.1:*".to_string(),
    ]
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let expanded_content = ENV_PLACEHOLDER.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// Layers, lowest precedence first:
/// - Built-in defaults.
/// - `config.yml` next to this crate, or `config_path_override`. The default file
///   is optional; an explicit override must exist. `${VAR}` placeholders are
///   replaced with environment values.
/// - Plain environment variables for top-level keys (`PORT`, `DB_URL`, `AI_API_URL`, ...).
/// - `FINBOT_`-prefixed variables for nested keys (e.g. `FINBOT_POOL__MAX_CONNECTIONS`).
///   `FINBOT_CORS_ORIGINS` takes a comma-separated list.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let config_path = match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            Some((path.to_string(), content))
        }
        None => {
            let default_path = format!("{}/config.yml", env!("CARGO_MANIFEST_DIR"));
            read_and_substitute(&default_path)?.map(|content| (default_path, content))
        }
    };
    if let Some((path, content)) = config_path {
        info!("Loading configuration from '{path}'.");
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("FINBOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("cors_origins"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;
    config.ai_api_key = config.ai_api_key.filter(|key| !key.trim().is_empty());

    Ok(config)
}
