//! Schema discovery and row projection.

use std::sync::Arc;

use common::errors::AppResult;
use common::models::{ColumnInfo, TableCatalog, TableName, TableSnapshot};

use crate::stores::RelationalStore;

/// Lists the tables and columns the console is allowed to touch.
#[derive(Clone)]
pub struct SchemaDiscoverer {
    store: Arc<dyn RelationalStore>,
}

impl SchemaDiscoverer {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self { store }
    }

    /// Current user tables, in catalog order.
    ///
    /// # Errors
    /// `Connectivity` if the store is unreachable, `Query` if the catalog
    /// query itself fails.
    pub async fn list_tables(&self) -> AppResult<TableCatalog> {
        let tables = self.store.list_tables().await?;
        tracing::debug!(count = tables.len(), "tables discovered");
        Ok(TableCatalog::new(tables))
    }

    /// Columns of a table that was just resolved against [`Self::list_tables`].
    pub async fn list_columns(&self, table: &TableName) -> AppResult<Vec<ColumnInfo>> {
        self.store.list_columns(table).await
    }
}

/// Reads whole tables into snapshots.
#[derive(Clone)]
pub struct RowProjector {
    store: Arc<dyn RelationalStore>,
}

impl RowProjector {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self { store }
    }

    /// Fetches every row of `table`.
    ///
    /// `table` must come from the same request's discovery output. Failures
    /// are recorded in the returned snapshot instead of being raised.
    pub async fn project_table(&self, table: TableName) -> TableSnapshot {
        match self.store.fetch_rows(&table).await {
            Ok(rows) => {
                let consistent = rows
                    .first()
                    .map(|first| rows.iter().all(|row| row.columns().eq(first.columns())))
                    .unwrap_or(true);
                if !consistent {
                    tracing::warn!(table = %table, "rows disagree on column layout");
                    return TableSnapshot::failed(table, "rows returned with inconsistent columns");
                }
                tracing::debug!(table = %table, rows = rows.len(), "table projected");
                TableSnapshot::ok(table, rows)
            }
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "table projection failed");
                TableSnapshot::failed(table, e)
            }
        }
    }
}
