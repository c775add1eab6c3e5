//! # Shared Constants
//!
//! This module provides a centralized location for the tuning knobs and the
//! fixed user-facing messages of the bot. Using these constants keeps the
//! fallback text identical across the library, the server and the CLI.

use std::time::Duration;

/// The default path for the main application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/finbot.db";

/// The default OpenAI-compatible chat completions endpoint.
pub const DEFAULT_AI_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// The default model identifier sent to the text-generation service.
pub const DEFAULT_AI_MODEL: &str = "llama3-8b-8192";

/// Network timeout applied to every text-generation call.
pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection pool bounds.
pub const DEFAULT_MIN_CONNECTIONS: usize = 1;
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// The maximum number of (question, answer) pairs kept in a conversation.
pub const HISTORY_CAPACITY: usize = 5;

/// How many of the most recent exchanges are shown to the translator.
pub const PROMPT_HISTORY_WINDOW: usize = 3;

/// The session used by `FinanceBot::ask` when the caller does not name one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// How many conversation sessions are kept before the least recently used is dropped.
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

// --- Fallback answers ---

pub const TRANSLATION_FAILED_MESSAGE: &str =
    "Sorry, I couldn't generate a valid SQL query for that.";

pub const EXECUTION_FAILED_MESSAGE: &str =
    "Sorry, I couldn't retrieve data for that request. Please try again later.";

pub const NO_RECORDS_MESSAGE: &str = "No matching records found for your request.";

/// Builds the answer used when prose generation fails for a non-empty result.
pub fn format_failed_message(record_count: usize) -> String {
    format!("{record_count} records found, but couldn't format a response.")
}
