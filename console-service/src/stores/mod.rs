//! Data store access.
//!
//! The engine talks to the relational and cache stores only through these
//! traits; `pg_store` and `redis_cache` hold the real clients.

pub mod pg_store;
pub mod redis_cache;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use common::errors::AppResult;
use common::models::{ColumnInfo, Row, TableName};
use common::utils::Statement;

pub use pg_store::PgStore;
pub use redis_cache::RedisCache;

/// The relational store.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Liveness check.
    async fn ping(&self) -> AppResult<()>;

    /// User tables of the default schema, in catalog order.
    async fn list_tables(&self) -> AppResult<Vec<TableName>>;

    /// Columns of a discovered table, in ordinal order.
    async fn list_columns(&self, table: &TableName) -> AppResult<Vec<ColumnInfo>>;

    /// Every row of a discovered table.
    async fn fetch_rows(&self, table: &TableName) -> AppResult<Vec<Row>>;

    /// Runs a mutation, returning the number of affected rows.
    async fn execute(&self, statement: &Statement) -> AppResult<u64>;
}

/// The cache store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Health check; must succeed before anything else is read.
    async fn ping(&self) -> AppResult<()>;

    /// Keys matching a glob pattern. Keys are binary-safe, so raw bytes.
    async fn keys(&self, pattern: &str) -> AppResult<Vec<Vec<u8>>>;

    /// Raw value of a string key; `None` if the key no longer exists.
    async fn get(&self, key: &[u8]) -> AppResult<Option<Vec<u8>>>;
}
