//! # Schema Catalog
//!
//! Holds the table/column map the translator grounds its prompts in. The map is
//! loaded once when the bot is built and only changes on an explicit refresh.

use crate::{providers::db::storage::Storage, types::SchemaMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
pub struct SchemaCatalog {
    schema: RwLock<Arc<SchemaMap>>,
}

impl SchemaCatalog {
    /// Introspects `storage`. A failed load leaves the catalog empty rather than erroring.
    pub async fn load(storage: &dyn Storage) -> Self {
        Self {
            schema: RwLock::new(Arc::new(introspect(storage).await)),
        }
    }

    pub fn from_schema(schema: SchemaMap) -> Self {
        Self {
            schema: RwLock::new(Arc::new(schema)),
        }
    }

    /// The current map. Readers keep their snapshot even if a refresh lands meanwhile.
    pub async fn schema(&self) -> Arc<SchemaMap> {
        Arc::clone(&*self.schema.read().await)
    }

    /// Re-runs introspection and swaps in the result, returning the table count.
    pub async fn refresh(&self, storage: &dyn Storage) -> usize {
        let fresh = introspect(storage).await;
        let tables = fresh.table_count();
        *self.schema.write().await = Arc::new(fresh);
        tables
    }
}

async fn introspect(storage: &dyn Storage) -> SchemaMap {
    match storage.load_schema().await {
        Ok(schema) if schema.is_empty() => {
            warn!(
                "[catalog] {} reported no tables; SQL generation is disabled",
                storage.name()
            );
            schema
        }
        Ok(schema) => {
            info!(
                "[catalog] Loaded {} tables from {}",
                schema.table_count(),
                storage.name()
            );
            schema
        }
        Err(e) => {
            error!("[catalog] Error loading schema: {e}");
            SchemaMap::new()
        }
    }
}
