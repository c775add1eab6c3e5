use crate::{
    errors::BotError,
    providers::db::{
        pool::{ConnectionPool, PoolConfig},
        storage::Storage,
    },
    types::{CellValue, ResultSet, Row, SchemaMap},
};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::Value as TursoValue;

pub mod sql;

/// A provider for a local SQLite database using Turso.
///
/// All access goes through a bounded [`ConnectionPool`]. When cloned, the
/// provider shares the same pool, so clones see the same database file or
/// in-memory instance.
#[derive(Clone)]
pub struct SqliteProvider {
    pool: ConnectionPool,
}

fn op_failed(e: impl ToString) -> BotError {
    BotError::StorageOperationFailed(e.to_string())
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` with the default pool bounds (1..=10).
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for an
    ///   isolated in-memory database; clone the provider to share it.
    pub async fn new(db_path: &str) -> Result<Self, BotError> {
        Self::with_pool_config(db_path, PoolConfig::default()).await
    }

    /// Creates a new `SqliteProvider` with explicit pool bounds.
    pub async fn with_pool_config(db_path: &str, config: PoolConfig) -> Result<Self, BotError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| BotError::StorageConnection(e.to_string()))?;
        let pool = ConnectionPool::new(db, config)?;

        {
            let conn = pool.acquire().await?;
            // PRAGMA returns a row, so it goes through `query`. No effect on in-memory databases.
            conn.query("PRAGMA journal_mode=WAL;", ())
                .await
                .map_err(|e| BotError::StorageConnection(e.to_string()))?;
        }

        info!(db_path = %db_path, "SQLite provider ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// A helper for seeding data by executing multiple `;`-separated statements.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), BotError> {
        let conn = self.pool.acquire().await?;
        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ()).await.map_err(op_failed)?;
        }
        Ok(())
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider")
            .field("pool", &self.pool)
            .finish()
    }
}

/// Converts a Turso value into the store-neutral cell representation.
fn turso_value_to_cell(v: TursoValue) -> CellValue {
    match v {
        TursoValue::Null => CellValue::Null,
        TursoValue::Integer(i) => CellValue::Integer(i),
        TursoValue::Real(f) => CellValue::Real(f),
        TursoValue::Text(s) => CellValue::from_text(s),
        TursoValue::Blob(b) => CellValue::Blob(b),
    }
}

#[async_trait]
impl Storage for SqliteProvider {
    fn name(&self) -> &str {
        "SQLite"
    }

    fn dialect(&self) -> &str {
        "SQLite"
    }

    async fn load_schema(&self) -> Result<SchemaMap, BotError> {
        let conn = self.pool.acquire().await?;

        let mut table_names = Vec::new();
        let mut rows = conn
            .query(sql::LIST_USER_TABLES, ())
            .await
            .map_err(op_failed)?;
        while let Some(row) = rows.next().await.map_err(op_failed)? {
            if let Ok(TursoValue::Text(name)) = row.get_value(0) {
                table_names.push(name);
            }
        }

        let mut schema = SchemaMap::new();
        for table in &table_names {
            let mut rows = conn
                .query(&sql::table_info(table), ())
                .await
                .map_err(op_failed)?;
            while let Some(row) = rows.next().await.map_err(op_failed)? {
                if let Ok(TursoValue::Text(column)) = row.get_value(1) {
                    let data_type = match row.get_value(2) {
                        Ok(TursoValue::Text(t)) if !t.is_empty() => t,
                        _ => "ANY".to_string(),
                    };
                    schema.push_column(table.as_str(), column, data_type);
                }
            }
        }

        info!(tables = schema.table_count(), "Loaded SQLite schema");
        Ok(schema)
    }

    async fn execute_query(&self, query: &str) -> Result<ResultSet, BotError> {
        debug!(query = %query, "--> Executing SQLite query");

        let conn = self.pool.acquire().await?;
        let mut stmt = conn.prepare(query).await.map_err(op_failed)?;

        let column_names: Vec<String> = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut rows = stmt.query(()).await.map_err(op_failed)?;

        let mut results = ResultSet::new();
        while let Some(row) = rows.next().await.map_err(op_failed)? {
            let mut record = Row::new();
            for (i, name) in column_names.iter().enumerate() {
                let value = row.get_value(i).map_err(op_failed)?;
                record.push(name.as_str(), turso_value_to_cell(value));
            }
            results.push(record);
        }

        debug!(rows = results.len(), "<-- SQLite query finished");
        Ok(results)
    }
}
