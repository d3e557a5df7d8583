//! The aggregated status view.
//!
//! A [`StatusModel`] is built fresh for every status request and handed to
//! the presentation layer; nothing here is persisted.

use serde::Serialize;
use utoipa::ToSchema;

use super::row::Row;
use super::schema::TableName;

/// Health of one data source (or one table projection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    Error(String),
}

impl SourceStatus {
    pub fn error(message: impl std::fmt::Display) -> Self {
        SourceStatus::Error(message.to_string())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, SourceStatus::Ok)
    }
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceStatus::Ok => f.write_str("OK"),
            SourceStatus::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Point-in-time contents of one table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableSnapshot {
    /// Table name.
    pub name: TableName,
    /// Rows in the order returned by the store.
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,
    /// Outcome of the projection.
    pub status: SourceStatus,
}

impl TableSnapshot {
    pub fn ok(name: TableName, rows: Vec<Row>) -> Self {
        Self {
            name,
            rows,
            status: SourceStatus::Ok,
        }
    }

    pub fn failed(name: TableName, reason: impl std::fmt::Display) -> Self {
        Self {
            name,
            rows: Vec::new(),
            status: SourceStatus::error(reason),
        }
    }

    /// Column names, taken from the first row. Empty when there are no rows.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.columns().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolved value of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheValue {
    /// The key held a string value (possibly empty).
    Value(String),
    /// The key disappeared between enumeration and fetch.
    Vanished,
    /// The value could not be read, e.g. the key holds a hash or a list.
    Unreadable(String),
}

impl std::fmt::Display for CacheValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheValue::Value(value) => f.write_str(value),
            CacheValue::Vanished => f.write_str("(no value)"),
            CacheValue::Unreadable(reason) => write!(f, "(unreadable: {})", reason),
        }
    }
}

/// One key of the cache snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CacheEntry {
    pub key: String,
    pub value: CacheValue,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, value: CacheValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Everything the status page shows.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusModel {
    /// Relational store connectivity.
    pub database: SourceStatus,
    /// Cache store connectivity; `None` when the cache is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<SourceStatus>,
    /// One snapshot per discovered table, in discovery order.
    pub tables: Vec<TableSnapshot>,
    /// Cache entries sorted by key.
    pub cache_entries: Vec<CacheEntry>,
}

impl StatusModel {
    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.iter().find(|t| t.name.as_str() == name)
    }
}
