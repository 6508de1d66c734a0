//! SQLite-backed ark store

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, ToSql};
use tracing::{debug, info};

use super::errors::{StorageError, StorageResult};
use super::query::{ArkColumn, ArkPage, ArkQuery};
use super::record::ArkRecord;
use super::schema::{self, ARKS_COLUMNS, ARKS_TABLE, PRIMARY_KEY};
use super::ArkStore;

/// How long a read waits on a lock held by the ingestion process
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only view of an existing SQLite database holding the `arks` table
pub struct SqliteArkStore {
    conn: Mutex<Connection>,
}

impl SqliteArkStore {
    /// Open an existing database read-only and verify its schema.
    ///
    /// Fails if the file does not exist or the `arks` table does not match
    /// the declared layout.
    pub fn open(path: &Path) -> StorageResult<Self> {
        info!("Opening SQLite database at {:?}", path);

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|source| {
            StorageError::Open {
                path: path.display().to_string(),
                source,
            }
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Self::from_connection(conn)
    }

    /// Wrap an already open connection (for testing)
    pub fn from_connection(conn: Connection) -> StorageResult<Self> {
        schema::verify_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }
}

/// Collect projected records from a prepared query
fn fetch_records(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> StorageResult<Vec<ArkRecord>> {
    debug!("Executing query: {}", sql);

    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;

    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(ArkRecord::from_row(row)?);
    }
    Ok(records)
}

/// SQLite integers are signed; clamp larger values
fn sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl ArkStore for SqliteArkStore {
    fn page(&self, query: &ArkQuery) -> StorageResult<ArkPage> {
        self.with_conn(|conn| {
            // Count and page must read the same snapshot
            let tx = conn.unchecked_transaction()?;

            let mut where_clause = String::new();
            let mut params: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(filter) = &query.filter {
                where_clause = format!(" WHERE {} LIKE ? ESCAPE '\\'", filter.column.as_str());
                params.push(Box::new(filter.like_pattern()));
            }

            let count_sql = format!("SELECT COUNT(*) FROM {}{}", ARKS_TABLE, where_clause);
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let total: i64 = tx.query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))?;

            let mut sql = format!(
                "SELECT {} FROM {}{}",
                ARKS_COLUMNS.join(", "),
                ARKS_TABLE,
                where_clause
            );
            if let Some(sort) = query.sort {
                sql.push_str(&format!(
                    " ORDER BY {} {}",
                    sort.column.as_str(),
                    sort.order.as_sql()
                ));
                // Ties keep a stable order across pages
                if sort.column != ArkColumn::Ark {
                    sql.push_str(&format!(", {} ASC", PRIMARY_KEY));
                }
            }
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(Box::new(sql_int(query.page_size)));
            params.push(Box::new(sql_int(query.offset())));

            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let records = fetch_records(&tx, &sql, param_refs.as_slice())?;
            tx.commit()?;

            Ok(ArkPage {
                records,
                total_results: total.max(0) as u64,
            })
        })
    }

    fn all(&self) -> StorageResult<Vec<ArkRecord>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM {}", ARKS_COLUMNS.join(", "), ARKS_TABLE);
            fetch_records(conn, &sql, &[])
        })
    }

    fn count(&self) -> StorageResult<u64> {
        self.with_conn(|conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", ARKS_TABLE),
                [],
                |row| row.get(0),
            )?;
            Ok(total.max(0) as u64)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::{ArkFilter, ArkSort, SortOrder};

    fn create_test_store(rows: &[(&str, &str, &str)]) -> SqliteArkStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE arks (ark TEXT PRIMARY KEY, original_identifier TEXT, project TEXT, \
             url TEXT, path TEXT, valid BOOLEAN, validation_date DATETIME)",
        )
        .unwrap();
        for (ark, project, path) in rows {
            conn.execute(
                "INSERT INTO arks VALUES (?1, ?2, ?3, ?4, ?5, 1, '2024-05-01')",
                rusqlite::params![
                    ark,
                    format!("orig-{}", ark),
                    project,
                    format!("https://example.org/{}", ark),
                    path
                ],
            )
            .unwrap();
        }
        SqliteArkStore::from_connection(conn).unwrap()
    }

    #[test]
    fn test_page_without_filter() {
        let store = create_test_store(&[
            ("a1", "alpha", "/x"),
            ("a2", "beta", "/y"),
            ("a3", "alpha", "/z"),
        ]);

        let page = store
            .page(&ArkQuery {
                page_size: 2,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(page.total_results, 3);
        let arks: Vec<_> = page.records.iter().map(|r| r.ark.as_str()).collect();
        assert_eq!(arks, vec!["a1", "a2"]);
    }

    #[test]
    fn test_filter_and_sort() {
        let store = create_test_store(&[
            ("a1", "alpha", "/x"),
            ("a2", "beta", "/y"),
            ("a3", "alphabet", "/z"),
        ]);

        let page = store
            .page(&ArkQuery {
                filter: Some(ArkFilter::new(ArkColumn::Project, "ALPHA")),
                sort: Some(ArkSort {
                    column: ArkColumn::Ark,
                    order: SortOrder::Desc,
                }),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(page.total_results, 2);
        let arks: Vec<_> = page.records.iter().map(|r| r.ark.as_str()).collect();
        assert_eq!(arks, vec!["a3", "a1"]);
    }

    #[test]
    fn test_filter_treats_wildcards_literally() {
        let store = create_test_store(&[("a1", "p", "/100%/x"), ("a2", "p", "/100/x")]);

        let page = store
            .page(&ArkQuery {
                filter: Some(ArkFilter::new(ArkColumn::Path, "100%")),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(page.total_results, 1);
        assert_eq!(page.records[0].ark, "a1");
    }

    #[test]
    fn test_sort_ties_broken_by_ark() {
        let store = create_test_store(&[
            ("b", "same", "/1"),
            ("c", "same", "/2"),
            ("a", "same", "/3"),
        ]);

        let page = store
            .page(&ArkQuery {
                sort: Some(ArkSort {
                    column: ArkColumn::Project,
                    order: SortOrder::Desc,
                }),
                ..Default::default()
            })
            .unwrap();

        let arks: Vec<_> = page.records.iter().map(|r| r.ark.as_str()).collect();
        assert_eq!(arks, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let store = create_test_store(&[("a1", "p", "/x")]);

        let page = store
            .page(&ArkQuery {
                page: 5,
                ..Default::default()
            })
            .unwrap();

        assert!(page.records.is_empty());
        assert_eq!(page.total_results, 1);
    }

    #[test]
    fn test_all_and_count() {
        let store = create_test_store(&[("z", "p", "/x"), ("a", "p", "/y")]);

        let all = store.all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].ark, "z");
        assert_eq!(store.count().unwrap(), 2);
    }

    thread_local! {
        static INGESTER: std::cell::RefCell<Option<Connection>> =
            const { std::cell::RefCell::new(None) };
    }

    /// Commits a new row from a second connection when the page query starts
    fn ingest_before_page_select(sql: &str) {
        if !sql.contains("LIMIT") {
            return;
        }
        INGESTER.with(|ingester| {
            if let Some(writer) = ingester.borrow_mut().take() {
                writer
                    .execute(
                        "INSERT INTO arks (ark, project) VALUES ('a9', 'late')",
                        [],
                    )
                    .unwrap();
            }
        });
    }

    #[test]
    fn test_page_counts_same_snapshot_as_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arks.db");

        let writer = Connection::open(&path).unwrap();
        writer
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))
            .unwrap();
        writer
            .execute_batch(
                "CREATE TABLE arks (ark TEXT PRIMARY KEY, original_identifier TEXT, \
                 project TEXT, url TEXT, path TEXT, valid BOOLEAN, validation_date DATETIME);
                 INSERT INTO arks (ark, project) VALUES ('a1', 'p'), ('a2', 'p'), ('a3', 'p');",
            )
            .unwrap();

        let mut store = SqliteArkStore::open(&path).unwrap();
        store
            .conn
            .get_mut()
            .unwrap()
            .trace(Some(ingest_before_page_select));
        INGESTER.with(|ingester| *ingester.borrow_mut() = Some(writer));

        let page = store.page(&ArkQuery::default()).unwrap();
        assert!(INGESTER.with(|ingester| ingester.borrow().is_none()));
        assert_eq!(page.total_results, 3);
        assert_eq!(page.records.len(), 3);

        // The committed row is visible to the next request
        let page = store.page(&ArkQuery::default()).unwrap();
        assert_eq!(page.total_results, 4);
        assert_eq!(page.records.len(), 4);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqliteArkStore::open(&dir.path().join("missing.db"));
        assert!(matches!(result, Err(StorageError::Open { .. })));
    }
}
