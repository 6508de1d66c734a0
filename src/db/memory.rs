//! In-memory ark store
//!
//! Follows the same filtering, ordering and pagination rules as the SQLite
//! store, so handlers can be exercised without a database file.

use std::cmp::Ordering;
use std::sync::RwLock;

use super::errors::{StorageError, StorageResult};
use super::query::{ArkPage, ArkQuery, ArkSort, SortOrder};
use super::record::ArkRecord;
use super::ArkStore;

/// Ark store backed by a `Vec`, in insertion order
#[derive(Default)]
pub struct InMemoryArkStore {
    records: RwLock<Vec<ArkRecord>>,
}

impl InMemoryArkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ArkRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Append a record (fixtures only; the service itself never writes)
    pub fn insert(&self, record: ArkRecord) -> StorageResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::Internal("Lock poisoned".to_string()))?;
        records.push(record);
        Ok(())
    }

    fn snapshot(&self) -> StorageResult<Vec<ArkRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::Internal("Lock poisoned".to_string()))?;
        Ok(records.clone())
    }

    /// Apply ordering. Ties fall back to ascending ark.
    fn apply_ordering(records: &mut [ArkRecord], sort: ArkSort) {
        records.sort_by(|a, b| {
            let cmp = sort.column.value(a).cmp(&sort.column.value(b));
            let cmp = match sort.order {
                SortOrder::Asc => cmp,
                SortOrder::Desc => cmp.reverse(),
            };
            if cmp != Ordering::Equal {
                return cmp;
            }
            a.ark.cmp(&b.ark)
        });
    }
}

impl ArkStore for InMemoryArkStore {
    fn page(&self, query: &ArkQuery) -> StorageResult<ArkPage> {
        let mut records = self.snapshot()?;

        if let Some(filter) = &query.filter {
            records.retain(|r| filter.matches(r));
        }

        if let Some(sort) = query.sort {
            Self::apply_ordering(&mut records, sort);
        }

        let total_results = records.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page_size).unwrap_or(usize::MAX);
        let records = records.into_iter().skip(offset).take(limit).collect();

        Ok(ArkPage {
            records,
            total_results,
        })
    }

    fn all(&self) -> StorageResult<Vec<ArkRecord>> {
        self.snapshot()
    }

    fn count(&self) -> StorageResult<u64> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::Internal("Lock poisoned".to_string()))?;
        Ok(records.len() as u64)
    }
}
