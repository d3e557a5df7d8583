//! In-memory stores for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use common::errors::{AppError, AppResult};
use common::models::{CellValue, ColumnInfo, Row, TableName};
use common::utils::Statement;

use super::{CacheStore, RelationalStore};

struct MemoryTable {
    name: TableName,
    columns: Vec<ColumnInfo>,
    rows: Vec<Row>,
    broken: bool,
}

/// Relational store holding tables in memory, in declaration order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Vec<MemoryTable>>,
    unreachable: bool,
    executed: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the server were down.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Adds a table with `name:type` column specs.
    pub fn with_table(self, name: &str, columns: &[(&str, &str)]) -> Self {
        self.tables.lock().unwrap().push(MemoryTable {
            name: TableName::new(name),
            columns: columns
                .iter()
                .map(|(column, data_type)| ColumnInfo::new(*column, *data_type))
                .collect(),
            rows: Vec::new(),
            broken: false,
        });
        self
    }

    pub fn with_row(self, table: &str, row: Row) -> Self {
        self.table_mut(table, |t| t.rows.push(row));
        self
    }

    /// Makes projecting `table` fail, as after a concurrent drop.
    pub fn with_broken_table(self, table: &str) -> Self {
        self.table_mut(table, |t| t.broken = true);
        self
    }

    /// SQL of every statement executed so far.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn row_count(&self, table: &str) -> usize {
        let tables = self.tables.lock().unwrap();
        tables
            .iter()
            .find(|t| t.name.as_str() == table)
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }

    fn table_mut(&self, table: &str, f: impl FnOnce(&mut MemoryTable)) {
        let mut tables = self.tables.lock().unwrap();
        let entry = tables
            .iter_mut()
            .find(|t| t.name.as_str() == table)
            .expect("table declared with with_table");
        f(entry);
    }

    fn check_reachable(&self) -> AppResult<()> {
        if self.unreachable {
            return Err(AppError::Connectivity("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RelationalStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.check_reachable()
    }

    async fn list_tables(&self) -> AppResult<Vec<TableName>> {
        self.check_reachable()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.name.clone())
            .collect())
    }

    async fn list_columns(&self, table: &TableName) -> AppResult<Vec<ColumnInfo>> {
        self.check_reachable()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.name == table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn fetch_rows(&self, table: &TableName) -> AppResult<Vec<Row>> {
        self.check_reachable()?;
        let tables = self.tables.lock().unwrap();
        match tables.iter().find(|t| &t.name == table) {
            Some(t) if !t.broken => Ok(t.rows.clone()),
            _ => Err(AppError::Query(format!(
                "relation \"{}\" does not exist",
                table
            ))),
        }
    }

    async fn execute(&self, statement: &Statement) -> AppResult<u64> {
        self.check_reachable()?;
        self.executed.lock().unwrap().push(statement.sql());

        let mut tables = self.tables.lock().unwrap();
        let table = tables
            .iter_mut()
            .find(|t| &t.name == statement.table())
            .ok_or_else(|| AppError::Query(format!("relation \"{}\" does not exist", statement.table())))?;

        match statement {
            Statement::Insert { values, .. } => {
                let row = table.columns.iter().fold(Row::new(), |row, column| {
                    let value = values
                        .iter()
                        .find(|v| v.column.name == column.name)
                        .map(|v| CellValue::Text(v.value.clone()))
                        .unwrap_or(CellValue::Null);
                    row.with(column.name.clone(), value)
                });
                table.rows.push(row);
                Ok(1)
            }
            Statement::Delete { id, .. } => {
                let before = table.rows.len();
                table
                    .rows
                    .retain(|row| row.id().map(|v| v.to_string()) != Some(id.value.clone()));
                Ok((before - table.rows.len()) as u64)
            }
        }
    }
}

enum MemoryValue {
    Bytes(Vec<u8>),
    WrongType,
    Vanishing,
}

/// Cache store holding keys in memory.
#[derive(Default)]
pub struct MemoryCache {
    entries: BTreeMap<Vec<u8>, MemoryValue>,
    unreachable: bool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with(self, key: &str, value: &str) -> Self {
        self.with_raw(key.as_bytes(), value.as_bytes())
    }

    /// A key and value that need not be UTF-8.
    pub fn with_raw(mut self, key: &[u8], value: &[u8]) -> Self {
        self.entries
            .insert(key.to_vec(), MemoryValue::Bytes(value.to_vec()));
        self
    }

    /// A key holding a non-string type.
    pub fn with_hash(mut self, key: &str) -> Self {
        self.entries.insert(key.as_bytes().to_vec(), MemoryValue::WrongType);
        self
    }

    /// A key listed by KEYS that is gone by the time it is fetched.
    pub fn with_vanishing(mut self, key: &str) -> Self {
        self.entries.insert(key.as_bytes().to_vec(), MemoryValue::Vanishing);
        self
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn ping(&self) -> AppResult<()> {
        if self.unreachable {
            return Err(AppError::CacheUnavailable("connection refused".into()));
        }
        Ok(())
    }

    async fn keys(&self, _pattern: &str) -> AppResult<Vec<Vec<u8>>> {
        // Reverse order so callers cannot rely on the store sorting keys.
        Ok(self.entries.keys().rev().cloned().collect())
    }

    async fn get(&self, key: &[u8]) -> AppResult<Option<Vec<u8>>> {
        match self.entries.get(key) {
            Some(MemoryValue::Bytes(value)) => Ok(Some(value.clone())),
            Some(MemoryValue::WrongType) => Err(AppError::CacheOperation(
                "WRONGTYPE Operation against a key holding the wrong kind of value".into(),
            )),
            Some(MemoryValue::Vanishing) | None => Ok(None),
        }
    }
}
