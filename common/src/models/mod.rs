//! Shared data models.

pub mod forms;
pub mod row;
pub mod schema;
pub mod status;

// Re-export commonly used types
pub use forms::{DeleteForm, InsertForm};
pub use row::{CellValue, Row};
pub use schema::{ColumnInfo, TableCatalog, TableName};
pub use status::{CacheEntry, CacheValue, SourceStatus, StatusModel, TableSnapshot};
