#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared mock providers and database fixtures, so each test file can build a
//! bot against predictable inputs.

use async_trait::async_trait;
use dotenvy::dotenv;
use finbot::{
    errors::BotError,
    providers::{
        ai::{AiProvider, GenerationSettings},
        db::{sqlite::SqliteProvider, storage::Storage},
    },
    types::{ResultSet, SchemaMap},
};
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt::try_init();
    });
}

/// A small banking schema with a few rows, used across the bot tests.
pub const BANK_FIXTURE: &str = "
    CREATE TABLE account (account_id INTEGER PRIMARY KEY, customer_id INTEGER, balance REAL, opened_on TEXT);
    CREATE TABLE customer (customer_id INTEGER PRIMARY KEY, name TEXT NOT NULL);
    CREATE TABLE transactions (transaction_id INTEGER PRIMARY KEY, account_id INTEGER, amount REAL, date TEXT);
    INSERT INTO customer (customer_id, name) VALUES (1, 'Alice');
    INSERT INTO customer (customer_id, name) VALUES (2, 'Bob');
    INSERT INTO account (account_id, customer_id, balance, opened_on) VALUES (123, 1, 1500.25, '2021-03-04');
    INSERT INTO account (account_id, customer_id, balance, opened_on) VALUES (456, 2, 80.0, '2022-11-30');
    INSERT INTO transactions (transaction_id, account_id, amount, date) VALUES (1, 123, 50.0, '2024-01-15');
    INSERT INTO transactions (transaction_id, account_id, amount, date) VALUES (2, 123, -20.5, '2024-02-01 09:30:00');
    INSERT INTO transactions (transaction_id, account_id, amount, date) VALUES (3, 456, 10.0, '2024-01-20');
";

/// Opens an in-memory SQLite provider seeded with [`BANK_FIXTURE`].
pub async fn seeded_sqlite() -> SqliteProvider {
    let provider = SqliteProvider::new(":memory:")
        .await
        .expect("Failed to create SqliteProvider");
    provider
        .initialize_with_data(BANK_FIXTURE)
        .await
        .expect("Failed to seed the bank fixture");
    provider
}

/// Wraps a completion in the fenced block the translator looks for.
pub fn sql_completion(sql: &str) -> String {
    format!("```sql\n{sql}\n```")
}

// --- Mock AI Provider ---

/// Replays canned responses in order and records every prompt pair it sees.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<(String, String)>>>,
    pub settings_history: Arc<RwLock<Vec<GenerationSettings>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            settings_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.call_history.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_history.read().unwrap().len()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<String, BotError> {
        self.call_history
            .write()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        self.settings_history.write().unwrap().push(*settings);

        match self.responses.write().unwrap().pop() {
            Some(response) => Ok(response),
            None => Err(BotError::EmptyCompletion),
        }
    }
}

/// Fails every call with an API error.
#[derive(Clone, Debug, Default)]
pub struct FailingAiProvider {
    pub calls: Arc<RwLock<usize>>,
}

#[async_trait]
impl AiProvider for FailingAiProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _settings: &GenerationSettings,
    ) -> Result<String, BotError> {
        *self.calls.write().unwrap() += 1;
        Err(BotError::AiApi {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

// --- Mock Storage Provider ---

/// A store with a fixed schema whose queries return scripted results.
#[derive(Clone, Debug)]
pub struct MockStorage {
    pub schema: Result<SchemaMap, String>,
    pub results: Arc<RwLock<Vec<Result<ResultSet, String>>>>,
    pub executed: Arc<RwLock<Vec<String>>>,
}

impl MockStorage {
    pub fn new(schema: SchemaMap, results: Vec<Result<ResultSet, String>>) -> Self {
        Self {
            schema: Ok(schema),
            results: Arc::new(RwLock::new(results.into_iter().rev().collect())),
            executed: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A store whose introspection fails.
    pub fn unreachable() -> Self {
        Self {
            schema: Err("connection refused".to_string()),
            results: Arc::new(RwLock::new(Vec::new())),
            executed: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.read().unwrap().clone()
    }
}

#[async_trait]
impl Storage for MockStorage {
    fn name(&self) -> &str {
        "MockDB"
    }

    fn dialect(&self) -> &str {
        "PostgreSQL"
    }

    async fn load_schema(&self) -> Result<SchemaMap, BotError> {
        self.schema
            .clone()
            .map_err(BotError::StorageConnection)
    }

    async fn execute_query(&self, query: &str) -> Result<ResultSet, BotError> {
        self.executed.write().unwrap().push(query.to_string());
        match self.results.write().unwrap().pop() {
            Some(result) => result.map_err(BotError::StorageOperationFailed),
            None => Ok(ResultSet::new()),
        }
    }
}

/// The schema used by the scripted-storage tests.
pub fn bank_schema() -> SchemaMap {
    let mut schema = SchemaMap::new();
    schema.push_column("account", "account_id", "INTEGER");
    schema.push_column("account", "balance", "NUMERIC");
    schema.push_column("transactions", "transaction_id", "INTEGER");
    schema.push_column("transactions", "account_id", "INTEGER");
    schema.push_column("transactions", "amount", "NUMERIC");
    schema.push_column("transactions", "date", "DATE");
    schema
}
