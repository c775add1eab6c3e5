use std::time::Duration;
use thiserror::Error;

/// Infrastructure errors raised by the providers and the connection pool.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("AI provider did not respond within {0:?}")]
    AiTimeout(Duration),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error (status {status}): {body}")]
    AiApi { status: u16, body: String },
    #[error("AI provider returned an empty completion")]
    EmptyCompletion,
    #[error("Storage provider connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("No database connection available: {0}")]
    ConnectionUnavailable(String),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("AI provider is missing")]
    MissingAiProvider,
    #[error("Storage provider is missing")]
    MissingStorageProvider,
}

/// Why the translator produced no SQL for a question.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Introspection found no tables, so no SQL is attempted.
    #[error("schema is unavailable; no SQL generated")]
    SchemaUnavailable,
    /// The text-generation call failed.
    #[error("SQL generation failed: {0}")]
    Service(#[source] BotError),
    /// The completion did not carry a fenced `sql` block.
    #[error("completion did not contain a fenced sql block")]
    NoSqlBlock,
}
