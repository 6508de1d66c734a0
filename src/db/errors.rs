//! # Database Errors
//!
//! Error types for the ark store.

use thiserror::Error;

/// Result type for store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Store errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database file could not be opened
    #[error("Failed to open database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Declared table is not present in the database
    #[error("Table not found: {0}")]
    MissingTable(String),

    /// Declared columns are not present on the table
    #[error("Table {table} is missing columns: {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    /// A row violated a record invariant
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Internal error (poisoned lock, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Whether this error means the database does not match the declared schema
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            StorageError::MissingTable(_) | StorageError::MissingColumns { .. }
        )
    }
}
