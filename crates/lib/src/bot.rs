//! # Conversation Orchestrator
//!
//! `FinanceBot` runs one turn as translate → execute → compose → record. Every
//! stage reports a typed outcome, and each failure branch maps to a fixed
//! answer, so `ask` always returns printable text.

use crate::{
    catalog::SchemaCatalog,
    composer::{ResponseComposer, ResponseStrategy},
    constants::{
        DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_ID, EXECUTION_FAILED_MESSAGE,
        TRANSLATION_FAILED_MESSAGE,
    },
    context::ConversationContext,
    errors::{BotError, TranslationError},
    executor::QueryExecutor,
    providers::{ai::AiProvider, db::storage::Storage},
    session::SessionStore,
    translator::QueryTranslator,
    types::{GeneratedSql, SchemaMap},
};
use std::sync::Arc;
use tracing::{info, warn};

/// How a single turn ended.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The query ran and the composer produced an answer. The context was updated.
    Answered {
        sql: GeneratedSql,
        row_count: usize,
        answer: String,
    },
    /// No SQL could be produced. The context is left untouched.
    TranslationFailed(TranslationError),
    /// The SQL failed in the store. The context is left untouched.
    ExecutionFailed { sql: GeneratedSql, error: BotError },
}

impl TurnOutcome {
    /// The text shown to the user for this outcome.
    pub fn answer(&self) -> &str {
        match self {
            Self::Answered { answer, .. } => answer,
            Self::TranslationFailed(_) => TRANSLATION_FAILED_MESSAGE,
            Self::ExecutionFailed { .. } => EXECUTION_FAILED_MESSAGE,
        }
    }

    pub fn into_answer(self) -> String {
        match self {
            Self::Answered { answer, .. } => answer,
            other => other.answer().to_string(),
        }
    }

    pub fn sql(&self) -> Option<&GeneratedSql> {
        match self {
            Self::Answered { sql, .. } | Self::ExecutionFailed { sql, .. } => Some(sql),
            Self::TranslationFailed(_) => None,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered { .. })
    }
}

/// A question-answering bot over one relational store.
#[derive(Debug)]
pub struct FinanceBot {
    catalog: SchemaCatalog,
    translator: QueryTranslator,
    executor: QueryExecutor,
    composer: ResponseComposer,
    sessions: SessionStore,
}

impl FinanceBot {
    pub fn builder() -> FinanceBotBuilder {
        FinanceBotBuilder::new()
    }

    /// Answers `question` in the default session.
    pub async fn ask(&self, question: &str) -> String {
        self.ask_in_session(DEFAULT_SESSION_ID, question).await
    }

    /// Answers `question` using, and updating, the context of `session_id`.
    ///
    /// Turns on the same session are serialized.
    pub async fn ask_in_session(&self, session_id: &str, question: &str) -> String {
        let session = self.sessions.session(session_id);
        let mut context = session.lock().await;
        self.ask_with_context(question, &mut context)
            .await
            .into_answer()
    }

    /// Runs one turn against an explicitly owned context.
    pub async fn ask_with_context(
        &self,
        question: &str,
        context: &mut ConversationContext,
    ) -> TurnOutcome {
        let question = question.trim();
        info!("[ask] Received question: {question:?}");

        let schema = self.catalog.schema().await;
        let sql = match self
            .translator
            .translate(question, &schema, &context.snapshot())
            .await
        {
            Ok(sql) => sql,
            Err(e) => {
                warn!("[ask] Translation failed: {e}");
                return TurnOutcome::TranslationFailed(e);
            }
        };

        let rows = match self.executor.execute(&sql).await {
            Ok(rows) => rows,
            Err(error) => {
                warn!("[ask] Execution failed: {error}");
                return TurnOutcome::ExecutionFailed { sql, error };
            }
        };

        let answer = self.composer.compose(question, Some(rows.as_slice())).await;
        context.set_last_query_type(sql.primary_table());
        context.record(question, answer.as_str());

        TurnOutcome::Answered {
            sql,
            row_count: rows.len(),
            answer,
        }
    }

    /// Re-reads the store's catalog. Returns the number of tables now known.
    pub async fn refresh_schema(&self) -> usize {
        self.catalog.refresh(self.executor.storage()).await
    }

    pub async fn schema(&self) -> Arc<SchemaMap> {
        self.catalog.schema().await
    }

    pub async fn test_connection(&self) -> bool {
        self.executor.test_connection().await
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// A builder for creating `FinanceBot` instances.
pub struct FinanceBotBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    storage_provider: Option<Box<dyn Storage>>,
    response_strategy: ResponseStrategy,
    max_sessions: usize,
}

impl Default for FinanceBotBuilder {
    fn default() -> Self {
        Self {
            ai_provider: None,
            storage_provider: None,
            response_strategy: ResponseStrategy::default(),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl FinanceBotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text-generation service used for both translation and composition.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    pub fn storage_provider(mut self, storage_provider: Box<dyn Storage>) -> Self {
        self.storage_provider = Some(storage_provider);
        self
    }

    pub fn response_strategy(mut self, strategy: ResponseStrategy) -> Self {
        self.response_strategy = strategy;
        self
    }

    /// Caps how many conversation sessions are kept at once.
    pub fn max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Builds the bot, introspecting the store once.
    ///
    /// A failed introspection does not fail the build; the bot then answers
    /// every question with the translation-failure message until
    /// `refresh_schema` finds tables.
    pub async fn build(self) -> Result<FinanceBot, BotError> {
        let ai_provider = self.ai_provider.ok_or(BotError::MissingAiProvider)?;
        let storage = self
            .storage_provider
            .ok_or(BotError::MissingStorageProvider)?;

        let catalog = SchemaCatalog::load(storage.as_ref()).await;
        let translator = QueryTranslator::new(ai_provider.clone(), storage.dialect());
        let composer = ResponseComposer::new(ai_provider, self.response_strategy);

        Ok(FinanceBot {
            catalog,
            translator,
            executor: QueryExecutor::new(storage),
            composer,
            sessions: SessionStore::with_capacity(self.max_sessions),
        })
    }
}
