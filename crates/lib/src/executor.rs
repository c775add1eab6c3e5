//! # Query Executor
//!
//! Runs generated SQL verbatim against the store. The storage provider borrows a
//! pooled connection for the duration of the call and hands it back on every
//! path, so a failed statement never leaks a connection.

use crate::{
    errors::BotError,
    providers::db::storage::Storage,
    types::{GeneratedSql, ResultSet},
};
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct QueryExecutor {
    storage: Box<dyn Storage>,
}

impl QueryExecutor {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Executes `sql` and returns every row. Errors are logged with the statement text.
    pub async fn execute(&self, sql: &GeneratedSql) -> Result<ResultSet, BotError> {
        match self.storage.execute_query(sql.as_str()).await {
            Ok(rows) => {
                info!("[execute] {} rows returned", rows.len());
                Ok(rows)
            }
            Err(e) => {
                error!("[execute] Query execution error: {e} (sql: {sql})");
                Err(e)
            }
        }
    }

    /// Round-trips a trivial query to check the store is reachable.
    pub async fn test_connection(&self) -> bool {
        match self.storage.ping().await {
            Ok(()) => true,
            Err(e) => {
                error!("[execute] Connection test failed: {e}");
                false
            }
        }
    }
}
