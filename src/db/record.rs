//! Ark record projection

use rusqlite::types::ValueRef;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::errors::{StorageError, StorageResult};

/// A single ark as returned to callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArkRecord {
    pub ark: String,
    pub original_identifier: Option<String>,
    pub project: Option<String>,
    pub url: Option<String>,
    pub path: Option<String>,
    pub valid: Option<bool>,
    pub validation_date: Option<String>,
}

impl ArkRecord {
    /// Project a row of the `arks` table
    pub fn from_row(row: &Row) -> StorageResult<Self> {
        let ark = text_column(row, "ark")?
            .ok_or_else(|| StorageError::InvalidRow("ark is NULL".to_string()))?;

        Ok(Self {
            ark,
            original_identifier: text_column(row, "original_identifier")?,
            project: text_column(row, "project")?,
            url: text_column(row, "url")?,
            path: text_column(row, "path")?,
            valid: bool_column(row, "valid")?,
            validation_date: text_column(row, "validation_date")?,
        })
    }
}

/// Read a column as text whatever its storage class
fn text_column(row: &Row, name: &str) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(name)? {
        ValueRef::Null => None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
    })
}

/// Read a boolean column. SQLite has no boolean type, so integers and the
/// usual textual spellings are accepted.
fn bool_column(row: &Row, name: &str) -> rusqlite::Result<Option<bool>> {
    Ok(match row.get_ref(name)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i != 0),
        ValueRef::Real(f) => Some(f != 0.0),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            match String::from_utf8_lossy(bytes).trim() {
                s if s == "1" || s.eq_ignore_ascii_case("true") => Some(true),
                s if s == "0" || s.eq_ignore_ascii_case("false") => Some(false),
                _ => None,
            }
        }
    })
}
