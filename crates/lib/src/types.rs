//! # Core Data Types
//!
//! The shapes that flow between the pipeline stages: the introspected schema,
//! the SQL extracted from a completion, and the typed rows returned by the store.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

// --- Schema ---

/// A single column and the type it was declared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// Table name to ordered columns, as discovered by introspection.
///
/// Tables iterate in name order; columns keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMap {
    tables: BTreeMap<String, Vec<ColumnInfo>>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column to `table`, creating the table entry on first use.
    pub fn push_column(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        data_type: impl Into<String>,
    ) {
        self.tables
            .entry(table.into())
            .or_default()
            .push(ColumnInfo {
                name: column.into(),
                data_type: data_type.into(),
            });
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn columns(&self, table: &str) -> Option<&[ColumnInfo]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &[ColumnInfo])> {
        self.tables
            .iter()
            .map(|(name, columns)| (name.as_str(), columns.as_slice()))
    }

    /// Renders one line per table: `Table accounts: id (INTEGER), owner (TEXT)`.
    pub fn render_for_prompt(&self) -> String {
        self.tables()
            .map(|(table, columns)| {
                let cols = columns
                    .iter()
                    .map(|c| format!("{} ({})", c.name, c.data_type))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Table {table}: {cols}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// --- Generated SQL ---

/// A single, non-empty SQL statement extracted from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSql(String);

impl GeneratedSql {
    /// Wraps `sql`, returning `None` when it is blank.
    pub fn new(sql: impl Into<String>) -> Option<Self> {
        let sql = sql.into();
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first table named after `FROM`, lowercased.
    pub fn primary_table(&self) -> Option<String> {
        let lower = self.0.to_lowercase();
        let mut words = lower.split_whitespace();
        while let Some(word) = words.next() {
            if word == "from" {
                return words.next().map(|table| {
                    table
                        .trim_matches(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                        .to_string()
                });
            }
        }
        None
    }
}

impl fmt::Display for GeneratedSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Result rows ---

/// A scalar read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Blob(Vec<u8>),
}

impl CellValue {
    /// Classifies a text value, promoting ISO dates and timestamps to temporal variants.
    pub fn from_text(text: String) -> Self {
        if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            return Self::Date(date);
        }
        for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(ts) = NaiveDateTime::parse_from_str(&text, pattern) {
                return Self::DateTime(ts);
            }
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(&text) {
            return Self::DateTime(ts.naive_local());
        }
        Self::Text(text)
    }

    /// Literal rendering, close to what the store would print.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Integer(i) => Value::Number((*i).into()),
            Self::Real(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s.clone()),
            Self::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(ts) => Value::String(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            Self::Blob(bytes) => Value::String(format!("<blob {} bytes>", bytes.len())),
        }
    }

    /// Numbers stay numeric, temporals collapse to `YYYY-MM-DD`, the rest become strings.
    pub fn normalized(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Integer(_) | Self::Real(_) => self.to_json(),
            Self::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(ts) => Value::String(ts.date().format("%Y-%m-%d").to_string()),
            Self::Text(_) | Self::Blob(_) => self.to_json(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Value::String(s) => f.write_str(&s),
            other => write!(f, "{other}"),
        }
    }
}

/// One result row: column names mapped to values in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.push((column.into(), value));
    }

    pub fn with(mut self, column: impl Into<String>, value: CellValue) -> Self {
        self.push(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn to_json(&self) -> Value {
        self.map_values(CellValue::to_json)
    }

    pub fn normalized(&self) -> Value {
        self.map_values(CellValue::normalized)
    }

    fn map_values(&self, f: impl Fn(&CellValue) -> Value) -> Value {
        let map: Map<String, Value> = self
            .cells
            .iter()
            .map(|(name, value)| (name.clone(), f(value)))
            .collect();
        Value::Object(map)
    }
}

/// The rows of one successful query. Empty means the query ran and matched nothing.
pub type ResultSet = Vec<Row>;
