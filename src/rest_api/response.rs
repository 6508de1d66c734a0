//! # Response Formatting
//!
//! Envelope returned by the list endpoint.

use serde::Serialize;

use crate::db::{ArkPage, ArkQuery, ArkRecord};

/// Page of records with pagination metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub total_results: u64,
}

impl PageResponse<ArkRecord> {
    /// Wrap a store page for the query that produced it
    pub fn from_page(query: &ArkQuery, page: ArkPage) -> Self {
        Self {
            total_pages: query.total_pages(page.total_results),
            data: page.records,
            page: query.page,
            page_size: query.page_size,
            total_results: page.total_results,
        }
    }
}
