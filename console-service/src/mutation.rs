//! Generic insert/delete against any discovered table.
//!
//! Table and column names arrive from the client. They reach the SQL text
//! only after being found in a discovery pass made for this very call; values
//! are always bound as parameters.

use std::collections::HashSet;
use std::sync::Arc;

use common::errors::{AppError, AppResult};
use common::models::{ColumnInfo, TableName};
use common::utils::{BoundValue, Statement};

use crate::discovery::SchemaDiscoverer;
use crate::stores::RelationalStore;

/// Column every deletable table must expose as its primary key.
pub const ID_COLUMN: &str = "id";

/// Validates and executes row mutations.
#[derive(Clone)]
pub struct MutationEngine {
    store: Arc<dyn RelationalStore>,
    discoverer: SchemaDiscoverer,
}

impl MutationEngine {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self {
            discoverer: SchemaDiscoverer::new(store.clone()),
            store,
        }
    }

    /// Inserts one row built from `fields` (column name, literal value).
    ///
    /// # Errors
    /// - `Validation` if `fields` is empty or names a column twice
    /// - `UnknownTable` / `UnknownColumn` if an identifier is not in the
    ///   current schema; nothing is executed in that case
    /// - `Insert` with the database's own message if the statement fails
    pub async fn insert_row(&self, table: &str, fields: Vec<(String, String)>) -> AppResult<u64> {
        if fields.is_empty() {
            return Err(AppError::Validation("no column values supplied".into()));
        }

        let (table, columns) = self.resolve(table).await?;

        let mut seen = HashSet::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            if !seen.insert(name.clone()) {
                return Err(AppError::Validation(format!(
                    "column `{}` supplied more than once",
                    name
                )));
            }
            let column = find_column(&columns, &table, &name)?;
            values.push(BoundValue::new(column, value));
        }

        let statement = Statement::insert(table, values)?;
        let affected = self
            .store
            .execute(&statement)
            .await
            .map_err(|e| AppError::Insert(store_message(e)))?;

        tracing::info!(table = %statement.table(), affected, "row inserted");
        Ok(affected)
    }

    /// Deletes the row whose `id` column equals `id`.
    ///
    /// Tables are assumed to use a column literally named `id` as primary
    /// key; tables without one are rejected with `MissingIdColumn`. Deleting
    /// an id that matches no row succeeds with zero affected rows.
    ///
    /// # Errors
    /// `UnknownTable`, `MissingIdColumn`, or `Delete` with the database's
    /// own message.
    pub async fn delete_row(&self, table: &str, id: &str) -> AppResult<u64> {
        let (table, columns) = self.resolve(table).await?;

        let id_column = columns
            .into_iter()
            .find(|c| c.name == ID_COLUMN)
            .ok_or_else(|| AppError::MissingIdColumn(table.to_string()))?;

        let statement = Statement::delete(table, id_column, id);
        let affected = self
            .store
            .execute(&statement)
            .await
            .map_err(|e| AppError::Delete(store_message(e)))?;

        if affected == 0 {
            tracing::debug!(table = %statement.table(), id = %id, "delete matched no row");
        } else {
            tracing::info!(table = %statement.table(), affected, "row deleted");
        }
        Ok(affected)
    }

    /// Revalidates `table` against a fresh discovery and loads its columns.
    async fn resolve(&self, table: &str) -> AppResult<(TableName, Vec<ColumnInfo>)> {
        let catalog = self.discoverer.list_tables().await?;
        let table = catalog.resolve(table)?.clone();
        let columns = self.discoverer.list_columns(&table).await?;
        Ok((table, columns))
    }
}

fn find_column(columns: &[ColumnInfo], table: &TableName, name: &str) -> AppResult<ColumnInfo> {
    columns
        .iter()
        .find(|c| c.name == name)
        .cloned()
        .ok_or_else(|| AppError::UnknownColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
}

/// The store's message without our own variant prefix, so the database text
/// reaches the caller as-is.
fn store_message(err: AppError) -> String {
    match err {
        AppError::Query(message) | AppError::Connectivity(message) => message,
        other => other.to_string(),
    }
}
