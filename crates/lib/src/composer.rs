//! # Response Composer
//!
//! Turns query rows into the answer shown to the user. The `Natural` strategy
//! asks the text-generation service for a short prose answer; the `Literal`
//! strategy prints the rows as pretty JSON. Both always produce non-empty text.

use crate::{
    constants::{format_failed_message, EXECUTION_FAILED_MESSAGE, NO_RECORDS_MESSAGE},
    errors::BotError,
    prompts::core::{COMPOSITION_SYSTEM_PROMPT, COMPOSITION_USER_PROMPT},
    providers::ai::{AiProvider, GenerationSettings},
    types::Row,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, error, info};

/// How non-empty results are turned into an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStrategy {
    /// Rows rendered as pretty-printed JSON.
    Literal,
    /// Rows summarized in prose by the text-generation service.
    #[default]
    Natural,
}

impl FromStr for ResponseStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "natural" => Ok(Self::Natural),
            other => Err(format!(
                "unknown response strategy '{other}' (expected 'literal' or 'natural')"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseComposer {
    ai_provider: Box<dyn AiProvider>,
    strategy: ResponseStrategy,
    settings: GenerationSettings,
}

impl ResponseComposer {
    pub fn new(ai_provider: Box<dyn AiProvider>, strategy: ResponseStrategy) -> Self {
        Self {
            ai_provider,
            strategy,
            settings: GenerationSettings::COMPOSITION,
        }
    }

    pub fn strategy(&self) -> ResponseStrategy {
        self.strategy
    }

    /// Composes the answer for `question`.
    ///
    /// `None` means execution failed and yields the retrieval-failure message;
    /// an empty slice means the query matched nothing.
    pub async fn compose(&self, question: &str, result: Option<&[Row]>) -> String {
        let rows = match result {
            None => return EXECUTION_FAILED_MESSAGE.to_string(),
            Some([]) => return NO_RECORDS_MESSAGE.to_string(),
            Some(rows) => rows,
        };

        match self.strategy {
            ResponseStrategy::Literal => literal_answer(rows),
            ResponseStrategy::Natural => match self.natural_answer(question, rows).await {
                Ok(answer) => answer,
                Err(e) => {
                    error!("[compose] Response generation failed: {e}");
                    format_failed_message(rows.len())
                }
            },
        }
    }

    async fn natural_answer(&self, question: &str, rows: &[Row]) -> Result<String, BotError> {
        let normalized: Vec<Value> = rows.iter().map(Row::normalized).collect();
        let data = serde_json::to_string_pretty(&normalized)?;
        let user_prompt = COMPOSITION_USER_PROMPT
            .replace("{question}", question)
            .replace("{data}", &data);

        debug!(user_prompt = %user_prompt, "--> Sending composition prompts to AI Provider");
        let answer = self
            .ai_provider
            .generate(COMPOSITION_SYSTEM_PROMPT, &user_prompt, &self.settings)
            .await?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(BotError::EmptyCompletion);
        }
        info!("[compose] Composed answer from {} rows", rows.len());
        Ok(answer.to_string())
    }
}

/// Renders rows as pretty JSON, keeping column order.
pub fn literal_answer(rows: &[Row]) -> String {
    if rows.is_empty() {
        return NO_RECORDS_MESSAGE.to_string();
    }
    let values = Value::Array(rows.iter().map(Row::to_json).collect());
    serde_json::to_string_pretty(&values).unwrap_or_else(|e| {
        error!("[compose] Could not render rows: {e}");
        format_failed_message(rows.len())
    })
}
