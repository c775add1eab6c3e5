//! # Default Prompt Templates
//!
//! The two prompts of a turn: one that turns a question into SQL, and one that
//! turns the resulting rows into a short answer.

// --- Query Translation Prompts ---

/// The system prompt for the translation stage.
///
/// It fixes the output contract: a single fenced `sql` block and nothing else.
///
/// Placeholders: `{dialect}`, `{schema}`, `{history}`, `{context}`
pub const TRANSLATION_SYSTEM_PROMPT: &str = r#"You are a financial database expert. Convert user questions to {dialect} SQL.

# Database Schema
{schema}

# Conversation History
{history}

# Current Context
{context}

# Rules
1. Use exact table/column names (all lowercase).
2. For customer info: JOIN account and customers.
3. For transactions: JOIN transactions and account.
4. For loans: JOIN loans and customers.
5. For "last X" or "most recent X": ORDER BY date DESC LIMIT 1.
6. NEVER use placeholder or example values.
7. ONLY return a single SQL statement inside a ```sql``` block.
8. Include all necessary WHERE clauses."#;

/// Shown in place of the history section on the first turn.
pub const EMPTY_HISTORY: &str = "(no previous questions)";

// --- Response Composition Prompts ---

/// The system prompt for the composition stage.
pub const COMPOSITION_SYSTEM_PROMPT: &str = "You are a professional banking assistant. Answer the customer's question using only the provided data. Be concise and courteous, state amounts and dates exactly as given, and do not mention SQL, tables or JSON.";

/// The user prompt for the composition stage.
///
/// Placeholders: `{question}`, `{data}`
pub const COMPOSITION_USER_PROMPT: &str = r#"# QUESTION:
{question}

# DATA:
{data}
"#;
