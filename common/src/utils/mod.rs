//! Utility functions and helpers.

pub mod identifier;
pub mod statement;

// Re-export commonly used types
pub use identifier::quote_ident;
pub use statement::{BoundValue, Statement};
