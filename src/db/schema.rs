//! Declared layout of the `arks` table
//!
//! The table is owned by an external ingestion process. It is never created
//! or migrated here; the declaration is checked against the live database
//! when the store is opened.

use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::errors::{StorageError, StorageResult};

/// Version of the declared layout
pub const SCHEMA_VERSION: u32 = 1;

/// Table holding ark records
pub const ARKS_TABLE: &str = "arks";

/// Primary key column
pub const PRIMARY_KEY: &str = "ark";

/// Columns every `arks` table must provide, in projection order
pub const ARKS_COLUMNS: [&str; 7] = [
    "ark",
    "original_identifier",
    "project",
    "url",
    "path",
    "valid",
    "validation_date",
];

/// A column as reported by `PRAGMA table_info`
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
    pub primary_key: bool,
}

/// Read the live column list of a table
pub fn table_columns(conn: &Connection, table: &str) -> StorageResult<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                declared_type: row.get(1)?,
                primary_key: row.get::<_, i64>(2)? > 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Check the live `arks` table against the declaration
pub fn verify_schema(conn: &Connection) -> StorageResult<()> {
    let columns = table_columns(conn, ARKS_TABLE)?;
    if columns.is_empty() {
        return Err(StorageError::MissingTable(ARKS_TABLE.to_string()));
    }

    for column in &columns {
        debug!(
            "{}.{} {} pk={}",
            ARKS_TABLE, column.name, column.declared_type, column.primary_key
        );
    }

    let missing: Vec<String> = ARKS_COLUMNS
        .iter()
        .filter(|name| !columns.iter().any(|c| c.name == **name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StorageError::MissingColumns {
            table: ARKS_TABLE.to_string(),
            columns: missing,
        });
    }

    let ark_is_key = columns
        .iter()
        .any(|c| c.name == PRIMARY_KEY && c.primary_key);
    if !ark_is_key {
        warn!(
            "{}.{} is not declared as the primary key; uniqueness is not enforced by the database",
            ARKS_TABLE, PRIMARY_KEY
        );
    }

    info!("Table {} matches schema v{}", ARKS_TABLE, SCHEMA_VERSION);
    Ok(())
}
