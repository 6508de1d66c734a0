//! # Ark Store
//!
//! Read-only access to the `arks` table.
//!
//! ## Architecture
//!
//! - `ArkStore` is the seam request handlers depend on
//! - `SqliteArkStore` reads an existing SQLite database
//! - `InMemoryArkStore` holds records in a `Vec` (tests, fixtures)
//!
//! The table is written by an external ingestion process; nothing here
//! creates, updates or deletes rows.

pub mod errors;
pub mod memory;
pub mod query;
pub mod record;
pub mod schema;
pub mod sqlite;

pub use errors::{StorageError, StorageResult};
pub use memory::InMemoryArkStore;
pub use query::{ArkColumn, ArkFilter, ArkPage, ArkQuery, ArkSort, SortOrder, DEFAULT_PAGE_SIZE};
pub use record::ArkRecord;
pub use sqlite::SqliteArkStore;

/// Store trait for ark reads
pub trait ArkStore: Send + Sync {
    /// Run a filtered, sorted, paginated query.
    ///
    /// `total_results` counts every record matching the filter,
    /// ignoring pagination.
    fn page(&self, query: &ArkQuery) -> StorageResult<ArkPage>;

    /// Every record, unfiltered and unsorted, in the database's default order
    fn all(&self) -> StorageResult<Vec<ArkRecord>>;

    /// Total number of records
    fn count(&self) -> StorageResult<u64>;
}
