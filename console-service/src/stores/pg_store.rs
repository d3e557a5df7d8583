//! PostgreSQL relational store.
//!
//! The pool is created once at startup and connects lazily, so the console
//! keeps serving (with an error status) while the database is down. Pooled
//! connections go back to the pool when each query future completes or is
//! dropped, on success and error paths alike.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use common::config::{AppConfig, DatabaseConfig};
use common::errors::{AppError, AppResult};
use common::models::{ColumnInfo, Row, TableName};
use common::utils::Statement;

use super::RelationalStore;

const LIST_TABLES_SQL: &str = "SELECT table_name::text
     FROM information_schema.tables
     WHERE table_schema = current_schema()
       AND table_type = 'BASE TABLE'";

const LIST_COLUMNS_SQL: &str = "SELECT column_name::text, udt_name::text
     FROM information_schema.columns
     WHERE table_schema = current_schema()
       AND table_name = $1
     ORDER BY ordinal_position";

/// Relational store backed by a `sqlx` Postgres pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Builds the pool without opening a connection yet.
    pub fn connect_lazy(config: &AppConfig) -> AppResult<Self> {
        let options = connect_options(&config.database)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_lazy_with(options);
        Ok(Self { pool })
    }

    /// Closes every pooled connection. Called at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RelationalStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Connectivity(e.to_string()))?;
        Ok(())
    }

    async fn list_tables(&self) -> AppResult<Vec<TableName>> {
        let names = sqlx::query_scalar::<_, String>(LIST_TABLES_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(names.into_iter().map(TableName::new).collect())
    }

    async fn list_columns(&self, table: &TableName) -> AppResult<Vec<ColumnInfo>> {
        let columns = sqlx::query_as::<_, (String, String)>(LIST_COLUMNS_SQL)
            .bind(table.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(columns
            .into_iter()
            .map(|(name, data_type)| ColumnInfo::new(name, data_type))
            .collect())
    }

    async fn fetch_rows(&self, table: &TableName) -> AppResult<Vec<Row>> {
        // `table` comes from this request's discovery output.
        let sql = format!("SELECT row_to_json(t)::text FROM {} AS t", table.quoted());
        let documents = sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        documents.iter().map(String::as_str).map(parse_row).collect()
    }

    async fn execute(&self, statement: &Statement) -> AppResult<u64> {
        let sql = statement.sql();
        tracing::debug!(table = %statement.table(), sql = %sql, "executing mutation");

        let mut query = sqlx::query(&sql);
        for param in statement.params() {
            query = query.bind(param);
        }

        let result = query.execute(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}

fn connect_options(config: &DatabaseConfig) -> AppResult<PgConnectOptions> {
    if let Some(url) = &config.url {
        return PgConnectOptions::from_str(url)
            .map_err(|e| AppError::Validation(format!("invalid DATABASE_URL: {}", e)));
    }

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.database);
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

fn parse_row(document: &str) -> AppResult<Row> {
    let object: Map<String, Value> = serde_json::from_str(document)
        .map_err(|e| AppError::Internal(format!("malformed row document: {}", e)))?;
    Ok(Row::from_json_object(object))
}

/// Pool and transport failures mean the store is unreachable; anything the
/// server itself rejected keeps the server's own message.
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_) => AppError::Connectivity(err.to_string()),
        sqlx::Error::Database(db_err) => AppError::Query(db_err.message().to_string()),
        _ => AppError::Query(err.to_string()),
    }
}
