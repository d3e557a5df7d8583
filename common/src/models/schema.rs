//! Discovered schema models.
//!
//! Table and column identifiers only ever come from the database catalog.
//! Names supplied by a client are plain strings until [`TableCatalog::resolve`]
//! finds them in the current discovery output.

use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};
use crate::utils::identifier::quote_ident;

/// Name of a table as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct TableName(String);

impl TableName {
    /// Wraps a catalog-provided table name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a quoted SQL identifier.
    pub fn quoted(&self) -> String {
        quote_ident(&self.0)
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column of a discovered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// PostgreSQL type name (`udt_name`), used to cast bound text values.
    pub data_type: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Allow-list of the tables visible in one discovery pass, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct TableCatalog {
    tables: Vec<TableName>,
}

impl TableCatalog {
    pub fn new(tables: Vec<TableName>) -> Self {
        Self { tables }
    }

    /// Looks up an untrusted table name.
    ///
    /// # Errors
    /// Returns `AppError::UnknownTable` if the name was not discovered.
    pub fn resolve(&self, name: &str) -> AppResult<&TableName> {
        self.tables
            .iter()
            .find(|table| table.as_str() == name)
            .ok_or_else(|| AppError::UnknownTable(name.to_string()))
    }

    pub fn tables(&self) -> &[TableName] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl IntoIterator for TableCatalog {
    type Item = TableName;
    type IntoIter = std::vec::IntoIter<TableName>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}
