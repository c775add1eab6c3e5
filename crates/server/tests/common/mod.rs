//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port, backed by a seeded
//! SQLite database in a temporary directory and a chat-completions endpoint
//! served by `httpmock`.

// Not every helper is used by every test file that includes this module.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use finbot::ResponseStrategy;
use finbot_server::{
    config::{AppConfig, PoolSettings},
    router,
    state::{build_app_state, AppState},
};
use httpmock::{Method::POST, Mock, MockServer};
use reqwest::Client;
use serde_json::json;
use std::{net::SocketAddr, path::PathBuf};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// The data every `TestApp` database starts with.
pub const BANK_FIXTURE: &str = "
    CREATE TABLE account (account_id INTEGER PRIMARY KEY, customer_id INTEGER, balance REAL);
    CREATE TABLE transactions (id INTEGER PRIMARY KEY, account_id INTEGER, amount REAL, date TEXT);
    INSERT INTO account (account_id, customer_id, balance) VALUES (123, 1, 1500.25);
    INSERT INTO transactions (id, account_id, amount, date) VALUES (1, 123, 50.0, '2024-01-15');
    INSERT INTO transactions (id, account_id, amount, date) VALUES (2, 123, -20.5, '2024-02-01');
";

/// Builds a configuration pointing at `mock_server` and a database under `dir`.
pub fn test_config(mock_server: &MockServer, dir: &TempDir) -> AppConfig {
    AppConfig {
        port: 0,
        // A nested path, so state building has to create the directory.
        db_url: dir
            .path()
            .join("db")
            .join("finbot.db")
            .to_string_lossy()
            .into_owned(),
        ai_api_url: mock_server.url(COMPLETIONS_PATH),
        ai_api_key: Some("test-key".to_string()),
        ai_model: "mock-chat-model".to_string(),
        ai_timeout_secs: 5,
        response_strategy: ResponseStrategy::Natural,
        pool: PoolSettings::default(),
        // Small enough for tests to reach the eviction path.
        max_sessions: 2,
        cors_origins: vec!["http://localhost:*".to_string()],
    }
}

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub db_path: PathBuf,
    pub app_state: AppState,
    _dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the server over a freshly seeded database.
    pub async fn spawn() -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start();
        let dir = tempdir()?;
        let config = test_config(&mock_server, &dir);
        let db_path = PathBuf::from(&config.db_url);

        let app_state = build_app_state(config).await?;
        app_state
            .sqlite_provider
            .initialize_with_data(BANK_FIXTURE)
            .await?;
        app_state.bot.refresh_schema().await;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let router_state = app_state.clone();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(router_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            db_path,
            app_state,
            _dir: dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Mocks the translation call to return `sql` in a fenced block.
    pub fn mock_translation(&self, sql: &str) -> Mock<'_> {
        let content = format!("```sql\n{sql}\n```");
        self.mock_server.mock(|when, then| {
            when.method(POST)
                .path(COMPLETIONS_PATH)
                .header("authorization", "Bearer test-key")
                .body_contains("financial database expert");
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            }));
        })
    }

    /// Mocks the composition call to return `answer`.
    pub fn mock_composition(&self, answer: &str) -> Mock<'_> {
        self.mock_server.mock(|when, then| {
            when.method(POST)
                .path(COMPLETIONS_PATH)
                .body_contains("professional banking assistant");
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": answer}}]
            }));
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
