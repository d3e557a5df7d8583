//! Form payloads of the mutation endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::errors::{AppError, AppResult};

/// Name of the form field that carries the target table.
pub const TABLE_FIELD: &str = "table";

/// Body of `POST /delete`.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteForm {
    /// Value of the row's `id` column.
    #[validate(length(min = 1, message = "id is required"))]
    pub id: String,

    /// Target table (untrusted until resolved against the catalog).
    #[validate(length(min = 1, message = "table is required"))]
    pub table: String,
}

/// Body of `POST /add`: the target table plus column/value pairs in form order.
///
/// The `table` field is reserved, so a column literally named `table`
/// cannot be filled through this form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertForm {
    pub table: String,
    pub fields: Vec<(String, String)>,
}

impl InsertForm {
    /// Splits raw urlencoded pairs into the table name and column values.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `table` is missing, empty or repeated.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> AppResult<Self> {
        let mut table = None;
        let mut fields = Vec::with_capacity(pairs.len());

        for (name, value) in pairs {
            if name == TABLE_FIELD {
                if table.replace(value).is_some() {
                    return Err(AppError::Validation("table supplied more than once".into()));
                }
            } else {
                fields.push((name, value));
            }
        }

        let table = table
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Validation("table is required".into()))?;

        Ok(Self { table, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_table_is_split_from_fields() {
        let form =
            InsertForm::from_pairs(pairs(&[("item", "pen"), ("table", "orders"), ("qty", "2")]))
                .unwrap();
        assert_eq!(form.table, "orders");
        assert_eq!(form.fields, pairs(&[("item", "pen"), ("qty", "2")]));
    }

    #[test]
    fn test_missing_table_is_rejected() {
        assert!(InsertForm::from_pairs(pairs(&[("item", "pen")])).is_err());
        assert!(InsertForm::from_pairs(pairs(&[("table", "")])).is_err());
    }

    #[test]
    fn test_repeated_table_is_rejected() {
        let result = InsertForm::from_pairs(pairs(&[("table", "orders"), ("table", "users")]));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_delete_form_validation() {
        let form = DeleteForm {
            id: String::new(),
            table: "orders".into(),
        };
        assert!(form.validate().is_err());
    }
}
