//! # Query Translator
//!
//! Turns a question into one SQL statement. The prompt grounds the model in the
//! introspected schema and the recent conversation; the only accepted output is
//! the first fenced block tagged `sql` in the completion.

use crate::{
    constants::PROMPT_HISTORY_WINDOW,
    context::ContextSnapshot,
    errors::{BotError, TranslationError},
    prompts::core::{EMPTY_HISTORY, TRANSLATION_SYSTEM_PROMPT},
    providers::ai::{AiProvider, GenerationSettings},
    types::{GeneratedSql, SchemaMap},
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, error, info, warn};

static SQL_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```sql\s*(.*?)\s*```").expect("SQL fence pattern is valid")
});

static PROMPT_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(dialect|schema|history|context)\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone)]
pub struct QueryTranslator {
    ai_provider: Box<dyn AiProvider>,
    dialect: String,
    settings: GenerationSettings,
}

impl QueryTranslator {
    pub fn new(ai_provider: Box<dyn AiProvider>, dialect: impl Into<String>) -> Self {
        Self {
            ai_provider,
            dialect: dialect.into(),
            settings: GenerationSettings::TRANSLATION,
        }
    }

    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Generates SQL for `question`.
    ///
    /// Returns `SchemaUnavailable` without calling the service when `schema` is
    /// empty, `Service` when the call fails, and `NoSqlBlock` when the
    /// completion has no fenced `sql` block.
    pub async fn translate(
        &self,
        question: &str,
        schema: &SchemaMap,
        context: &ContextSnapshot,
    ) -> Result<GeneratedSql, TranslationError> {
        if schema.is_empty() {
            warn!("[translate] No schema loaded; skipping SQL generation.");
            return Err(TranslationError::SchemaUnavailable);
        }

        let system_prompt = self
            .build_system_prompt(schema, context)
            .map_err(TranslationError::Service)?;
        debug!(system_prompt = %system_prompt, user_prompt = %question, "--> Sending translation prompts to AI Provider");

        let completion = self
            .ai_provider
            .generate(&system_prompt, question, &self.settings)
            .await
            .map_err(|e| {
                error!("[translate] SQL generation error: {e}");
                TranslationError::Service(e)
            })?;
        debug!("<-- Completion from AI: {completion}");

        match extract_sql_block(&completion) {
            Some(sql) => {
                info!("[translate] Generated SQL: {sql}");
                Ok(sql)
            }
            None => {
                warn!("[translate] Completion contained no ```sql``` block.");
                Err(TranslationError::NoSqlBlock)
            }
        }
    }

    /// Renders the system prompt: schema, the last few exchanges and the context slots.
    pub fn build_system_prompt(
        &self,
        schema: &SchemaMap,
        context: &ContextSnapshot,
    ) -> Result<String, BotError> {
        let recent = context.recent(PROMPT_HISTORY_WINDOW);
        let history = if recent.is_empty() {
            EMPTY_HISTORY.to_string()
        } else {
            recent
                .iter()
                .map(|e| format!("User: {}\nBot: {}", e.question, e.answer))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let slots = serde_json::to_string_pretty(&context.slots)?;

        let schema = schema.render_for_prompt();

        // One pass, so placeholder text inside inserted values stays as written.
        Ok(PROMPT_PLACEHOLDER
            .replace_all(TRANSLATION_SYSTEM_PROMPT, |caps: &regex::Captures| {
                match &caps[1] {
                    "dialect" => self.dialect.clone(),
                    "schema" => schema.clone(),
                    "history" => history.clone(),
                    _ => slots.clone(),
                }
            })
            .into_owned())
    }
}

/// Pulls the statement out of the first ```` ```sql ```` block of `completion`.
///
/// Only the first statement of the block is kept and a trailing `;` is dropped.
pub fn extract_sql_block(completion: &str) -> Option<GeneratedSql> {
    let block = SQL_FENCE.captures(completion)?.get(1)?.as_str();
    let (statement, discarded_rest) = first_statement(block);
    if discarded_rest {
        warn!("[translate] SQL block held more than one statement; keeping the first.");
    }
    GeneratedSql::new(statement)
}

/// Splits at the first `;` outside a quoted literal, identifier or `--` comment.
fn first_statement(sql: &str) -> (&str, bool) {
    let mut quote: Option<char> = None;
    let mut in_comment = false;
    let mut chars = sql.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '-') if matches!(chars.peek(), Some((_, '-'))) => {
                chars.next();
                in_comment = true;
            }
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, ';') => {
                let rest = &sql[i + 1..];
                return (&sql[..i], !rest.trim().is_empty());
            }
            (None, _) => {}
        }
    }
    (sql, false)
}
