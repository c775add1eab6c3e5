use crate::errors::BotError;
use crate::types::{ResultSet, SchemaMap};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with the relational store.
///
/// Implementations own their connections and must hand every borrowed
/// connection back before a method returns, whether it succeeds or fails.
#[async_trait]
pub trait Storage: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage provider (e.g., "SQLite").
    fn name(&self) -> &str;

    /// The SQL dialect the translator should target.
    fn dialect(&self) -> &str;

    /// Reads the store's catalog: every user table with its columns in declaration order.
    async fn load_schema(&self) -> Result<SchemaMap, BotError>;

    /// Executes a statement verbatim and materializes all of its rows.
    async fn execute_query(&self, query: &str) -> Result<ResultSet, BotError>;

    /// Verifies the store answers a trivial query.
    async fn ping(&self) -> Result<(), BotError> {
        self.execute_query("SELECT 1").await.map(|_| ())
    }
}

dyn_clone::clone_trait_object!(Storage);
