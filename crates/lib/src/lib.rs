//! # Finance Bot
//!
//! This crate answers natural-language banking questions by translating them into SQL
//! with a configurable AI provider, executing the SQL against a relational store and
//! composing the rows into a short answer. Conversation context is kept per session
//! so follow-up questions can refer to earlier turns.

pub mod bot;
pub mod catalog;
pub mod composer;
pub mod constants;
pub mod context;
pub mod errors;
pub mod executor;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod translator;
pub mod types;

pub use bot::{FinanceBot, FinanceBotBuilder, TurnOutcome};
pub use composer::{ResponseComposer, ResponseStrategy};
pub use context::{ContextSnapshot, ConversationContext};
pub use errors::{BotError, TranslationError};
pub use providers::{
    ai::{openai::OpenAiProvider, AiProvider, GenerationSettings},
    db::{
        pool::{ConnectionPool, PoolConfig, PoolStatus},
        sqlite::SqliteProvider,
        storage::Storage,
    },
};
pub use types::{CellValue, GeneratedSql, ResultSet, Row, SchemaMap};
