//! # Query Parameter Parser
//!
//! Parses the list endpoint's query string into an `ArkQuery`.
//!
//! - `sortBy` / `order`: validated against closed sets, rejected otherwise
//! - `page` / `pageSize`: fall back to defaults when unusable
//! - `ark`, `original_identifier`, `project`, `path`: substring filters,
//!   only the first non-empty one in that order is applied

use crate::db::{ArkColumn, ArkFilter, ArkQuery, ArkSort, SortOrder, DEFAULT_PAGE_SIZE};

use super::errors::{RestError, RestResult};

/// Default page if not specified
pub const DEFAULT_PAGE: u64 = 0;

/// Parse query parameters, in request order.
///
/// A repeated parameter uses its first occurrence.
pub fn parse_query(params: &[(String, String)]) -> RestResult<ArkQuery> {
    let get = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let sort_by = get("sortBy").map(parse_sort_by).transpose()?;
    let order = get("order").map(parse_order).transpose()?;

    let sort = match (sort_by, order) {
        (Some(column), Some(order)) => Some(ArkSort { column, order }),
        _ => None,
    };

    let filter = ArkColumn::FILTER_PRIORITY.into_iter().find_map(|column| {
        get(column.as_str())
            .filter(|needle| !needle.is_empty())
            .map(|needle| ArkFilter::new(column, needle))
    });

    Ok(ArkQuery {
        filter,
        sort,
        page: get("page").and_then(parse_page).unwrap_or(DEFAULT_PAGE),
        page_size: get("pageSize")
            .and_then(parse_page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE),
    })
}

/// Parse the sortBy parameter
fn parse_sort_by(value: &str) -> RestResult<ArkColumn> {
    ArkColumn::parse(value).ok_or_else(|| RestError::InvalidSortField(value.to_string()))
}

/// Parse the order parameter
fn parse_order(value: &str) -> RestResult<SortOrder> {
    SortOrder::parse(value).ok_or_else(|| RestError::InvalidSortOrder(value.to_string()))
}

/// Parse page; negative or non-integer values are unusable
fn parse_page(value: &str) -> Option<u64> {
    value.trim().parse::<i64>().ok().and_then(|n| u64::try_from(n).ok())
}

/// Parse pageSize; must be a positive integer
fn parse_page_size(value: &str) -> Option<u64> {
    parse_page(value).filter(|n| *n > 0)
}
