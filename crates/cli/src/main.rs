//! # finbot: a terminal chat for the Finance Bot
//!
//! Answers banking questions against a local SQLite database, one question per
//! line. Logs go to a file so the transcript stays readable.

mod chat;

use anyhow::Result;
use clap::Parser;
use finbot::{
    constants::{
        DEFAULT_AI_API_URL, DEFAULT_AI_MODEL, DEFAULT_DB_FILE, DEFAULT_MAX_CONNECTIONS,
        DEFAULT_MIN_CONNECTIONS,
    },
    FinanceBot, OpenAiProvider, PoolConfig, ResponseStrategy, SqliteProvider,
};
use std::{fs::File, time::Duration};
use tokio::io::{self, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, env = "DB_URL", default_value = DEFAULT_DB_FILE)]
    db_url: String,
    /// OpenAI-compatible chat completions endpoint
    #[arg(long, env = "AI_API_URL", default_value = DEFAULT_AI_API_URL)]
    ai_api_url: String,
    /// API key sent as a bearer token
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    ai_api_key: Option<String>,
    #[arg(long, env = "AI_MODEL", default_value = DEFAULT_AI_MODEL)]
    ai_model: String,
    /// Seconds to wait for each generation call
    #[arg(long, env = "AI_TIMEOUT_SECS", default_value_t = 30)]
    ai_timeout_secs: u64,
    /// How results are turned into answers: natural or literal
    #[arg(long, env = "RESPONSE_STRATEGY", default_value = "natural")]
    response_strategy: ResponseStrategy,
    #[arg(long, env = "DB_MIN_CONNECTIONS", default_value_t = DEFAULT_MIN_CONNECTIONS)]
    min_connections: usize,
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,
    /// Where to write logs
    #[arg(long, default_value = "finbot-cli.log")]
    log_file: String,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging to a file
    let log_file = File::create(&cli.log_file)?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let bot = match build_bot(&cli).await {
        Ok(bot) => bot,
        Err(e) => {
            error!("Failed to start Finance Bot: {e:?}");
            eprintln!("Failed to start Finance Bot: {e}");
            return Err(e);
        }
    };

    let stdin = BufReader::new(io::stdin());
    let mut stdout = io::stdout();
    tokio::select! {
        result = chat::run_chat(&bot, stdin, &mut stdout) => result?,
        _ = tokio::signal::ctrl_c() => {
            let mut out = io::stdout();
            out.write_all(format!("\nFinance Bot: {}\n", chat::INTERRUPTED_FAREWELL).as_bytes())
                .await?;
            out.flush().await?;
        }
    }

    info!("Chat session ended");
    Ok(())
}

async fn build_bot(cli: &Cli) -> Result<FinanceBot> {
    if let Some(parent) = std::path::Path::new(&cli.db_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool_config = PoolConfig {
        min_connections: cli.min_connections,
        max_connections: cli.max_connections,
        ..PoolConfig::default()
    };
    let storage = SqliteProvider::with_pool_config(&cli.db_url, pool_config).await?;
    let ai_provider = OpenAiProvider::with_timeout(
        cli.ai_api_url.clone(),
        cli.ai_api_key.clone(),
        Some(cli.ai_model.clone()),
        Duration::from_secs(cli.ai_timeout_secs),
    )?;

    let bot = FinanceBot::builder()
        .ai_provider(Box::new(ai_provider))
        .storage_provider(Box::new(storage))
        .response_strategy(cli.response_strategy)
        .build()
        .await?;

    if !bot.test_connection().await {
        anyhow::bail!("database test query failed");
    }
    info!(
        db_url = %cli.db_url,
        tables = bot.schema().await.table_count(),
        "Finance Bot ready"
    );
    Ok(bot)
}
