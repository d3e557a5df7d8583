//! Generic INSERT/DELETE statement building.
//!
//! Table and column identifiers are interpolated (quoted); values are always
//! positional parameters. Every bound value is sent as text and cast to the
//! column's type in SQL, so a form value like `"42"` lands in an `int4`
//! column without the driver needing to know the type.

use crate::errors::{AppError, AppResult};
use crate::models::schema::{ColumnInfo, TableName};
use crate::utils::identifier::quote_ident;

/// A text value bound to a known column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundValue {
    pub column: ColumnInfo,
    pub value: String,
}

impl BoundValue {
    pub fn new(column: ColumnInfo, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// A mutation ready for execution against the relational store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert {
        table: TableName,
        values: Vec<BoundValue>,
    },
    Delete {
        table: TableName,
        id: BoundValue,
    },
}

impl Statement {
    /// Builds an INSERT of the given column values.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `values` is empty.
    pub fn insert(table: TableName, values: Vec<BoundValue>) -> AppResult<Self> {
        if values.is_empty() {
            return Err(AppError::Validation("no column values supplied".into()));
        }
        Ok(Statement::Insert { table, values })
    }

    /// Builds a DELETE keyed on the `id` column.
    pub fn delete(table: TableName, id_column: ColumnInfo, id: impl Into<String>) -> Self {
        Statement::Delete {
            table,
            id: BoundValue::new(id_column, id),
        }
    }

    pub fn table(&self) -> &TableName {
        match self {
            Statement::Insert { table, .. } | Statement::Delete { table, .. } => table,
        }
    }

    /// SQL text with `$n` placeholders.
    pub fn sql(&self) -> String {
        match self {
            Statement::Insert { table, values } => {
                let columns = values
                    .iter()
                    .map(|v| quote_ident(&v.column.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                let placeholders = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| placeholder(i + 1, &v.column))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    table.quoted(),
                    columns,
                    placeholders
                )
            }
            Statement::Delete { table, id } => format!(
                "DELETE FROM {} WHERE {} = {}",
                table.quoted(),
                quote_ident(&id.column.name),
                placeholder(1, &id.column)
            ),
        }
    }

    /// Parameter values in placeholder order.
    pub fn params(&self) -> Vec<&str> {
        match self {
            Statement::Insert { values, .. } => values.iter().map(|v| v.value.as_str()).collect(),
            Statement::Delete { id, .. } => vec![id.value.as_str()],
        }
    }
}

fn placeholder(position: usize, column: &ColumnInfo) -> String {
    if column.data_type.is_empty() {
        format!("${}", position)
    } else {
        format!("CAST(${} AS {})", position, quote_ident(&column.data_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_binds_every_value() {
        let stmt = Statement::insert(
            TableName::new("orders"),
            vec![
                BoundValue::new(ColumnInfo::new("item", "varchar"), "pen'); DROP TABLE orders;--"),
                BoundValue::new(ColumnInfo::new("qty", "int4"), "2"),
            ],
        )
        .unwrap();

        assert_eq!(
            stmt.sql(),
            "INSERT INTO \"orders\" (\"item\", \"qty\") VALUES (CAST($1 AS \"varchar\"), CAST($2 AS \"int4\"))"
        );
        assert_eq!(stmt.params(), vec!["pen'); DROP TABLE orders;--", "2"]);
    }

    #[test]
    fn test_delete_sql() {
        let stmt = Statement::delete(TableName::new("orders"), ColumnInfo::new("id", "int8"), "17");
        assert_eq!(
            stmt.sql(),
            "DELETE FROM \"orders\" WHERE \"id\" = CAST($1 AS \"int8\")"
        );
        assert_eq!(stmt.params(), vec!["17"]);
    }

    #[test]
    fn test_untyped_column_has_bare_placeholder() {
        let stmt = Statement::delete(TableName::new("t"), ColumnInfo::new("id", ""), "1");
        assert_eq!(stmt.sql(), "DELETE FROM \"t\" WHERE \"id\" = $1");
    }

    #[test]
    fn test_empty_insert_is_rejected() {
        assert!(Statement::insert(TableName::new("orders"), vec![]).is_err());
    }
}
