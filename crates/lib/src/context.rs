//! # Conversational Context
//!
//! A short, bounded memory of the conversation plus a few loosely tracked slots.
//! Each conversation owns one `ConversationContext`; it is never shared between
//! sessions.

use crate::constants::HISTORY_CAPACITY;
use serde::Serialize;
use std::collections::VecDeque;

/// One answered turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// The scalar slots carried from turn to turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextSlots {
    pub current_account: Option<String>,
    pub current_customer: Option<String>,
    pub last_query_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    slots: ContextSlots,
    history: VecDeque<Exchange>,
}

/// A read-only copy of a context, handed to the translator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextSnapshot {
    pub slots: ContextSlots,
    /// Oldest first.
    pub history: Vec<Exchange>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an exchange, then drops the oldest ones beyond capacity.
    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.history.push_back(Exchange {
            question: question.into(),
            answer: answer.into(),
        });
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            slots: self.slots.clone(),
            history: self.history.iter().cloned().collect(),
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &Exchange> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn slots(&self) -> &ContextSlots {
        &self.slots
    }

    pub fn set_current_account(&mut self, account: Option<String>) {
        self.slots.current_account = account;
    }

    pub fn set_current_customer(&mut self, customer: Option<String>) {
        self.slots.current_customer = customer;
    }

    pub fn set_last_query_type(&mut self, query_type: Option<String>) {
        self.slots.last_query_type = query_type;
    }

    /// Forgets the history and every slot.
    pub fn clear(&mut self) {
        self.history.clear();
        self.slots = ContextSlots::default();
    }
}

impl ContextSnapshot {
    /// The last `n` exchanges, oldest first.
    pub fn recent(&self, n: usize) -> &[Exchange] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }
}
