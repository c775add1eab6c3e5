//! # Application State
//!
//! The shared application state (`AppState`) and the logic for building it at
//! startup: the SQLite store with its connection pool, the chat-completions
//! client and the bot wired from both.

use crate::config::AppConfig;
use finbot::{FinanceBot, OpenAiProvider, SqliteProvider};
use std::{path::Path, sync::Arc, time::Duration};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml` and the environment.
    pub config: Arc<AppConfig>,
    pub bot: Arc<FinanceBot>,
    /// The store behind the bot, kept for diagnostics.
    pub sqlite_provider: SqliteProvider,
}

/// Builds the shared application state from the configuration.
///
/// Creates the database's parent directory when needed and introspects the
/// schema once.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    if let Some(parent) = Path::new(&config.db_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let sqlite_provider =
        SqliteProvider::with_pool_config(&config.db_url, config.pool.to_pool_config()).await?;

    let ai_provider = OpenAiProvider::with_timeout(
        config.ai_api_url.clone(),
        config.ai_api_key.clone(),
        Some(config.ai_model.clone()),
        Duration::from_secs(config.ai_timeout_secs),
    )?;

    let bot = FinanceBot::builder()
        .ai_provider(Box::new(ai_provider))
        .storage_provider(Box::new(sqlite_provider.clone()))
        .response_strategy(config.response_strategy)
        .max_sessions(config.max_sessions)
        .build()
        .await?;
    info!(
        tables = bot.schema().await.table_count(),
        strategy = ?config.response_strategy,
        "FinanceBot initialized"
    );

    Ok(AppState {
        config: Arc::new(config),
        bot: Arc::new(bot),
        sqlite_provider,
    })
}
