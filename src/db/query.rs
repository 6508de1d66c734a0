//! # Ark Query
//!
//! Query description shared by the request parser and the stores.
//! Columns usable for sorting and filtering form a closed set.

use super::record::ArkRecord;

/// Default page size when none (or an unusable one) is supplied
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Columns that can be sorted and filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArkColumn {
    Ark,
    OriginalIdentifier,
    Project,
    Path,
}

impl ArkColumn {
    /// Filter priority order: the first non-empty filter in this order wins
    pub const FILTER_PRIORITY: [ArkColumn; 4] = [
        ArkColumn::Ark,
        ArkColumn::OriginalIdentifier,
        ArkColumn::Project,
        ArkColumn::Path,
    ];

    /// Column name in the `arks` table (also the query parameter name)
    pub fn as_str(&self) -> &'static str {
        match self {
            ArkColumn::Ark => "ark",
            ArkColumn::OriginalIdentifier => "original_identifier",
            ArkColumn::Project => "project",
            ArkColumn::Path => "path",
        }
    }

    /// Parse a column name. Matching is exact and case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::FILTER_PRIORITY
            .into_iter()
            .find(|column| column.as_str() == name)
    }

    /// Read this column from a record
    pub fn value<'a>(&self, record: &'a ArkRecord) -> Option<&'a str> {
        match self {
            ArkColumn::Ark => Some(record.ark.as_str()),
            ArkColumn::OriginalIdentifier => record.original_identifier.as_deref(),
            ArkColumn::Project => record.project.as_deref(),
            ArkColumn::Path => record.path.as_deref(),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a direction. Only lowercase `asc` and `desc` are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Order by clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArkSort {
    pub column: ArkColumn,
    pub order: SortOrder,
}

/// Substring filter on a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArkFilter {
    pub column: ArkColumn,
    pub needle: String,
}

impl ArkFilter {
    pub fn new(column: ArkColumn, needle: impl Into<String>) -> Self {
        Self {
            column,
            needle: needle.into(),
        }
    }

    /// Check if a record matches this filter.
    ///
    /// Containment ignores ASCII case, the same way SQLite's `LIKE` does.
    /// NULL columns never match.
    pub fn matches(&self, record: &ArkRecord) -> bool {
        match self.column.value(record) {
            Some(value) => contains_ignore_ascii_case(value, &self.needle),
            None => false,
        }
    }

    /// `LIKE` pattern with `%`, `_` and `\` escaped (used with `ESCAPE '\'`)
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.needle.len() + 2);
        pattern.push('%');
        for c in self.needle.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

/// A filtered, sorted, paginated query over the `arks` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArkQuery {
    pub filter: Option<ArkFilter>,
    pub sort: Option<ArkSort>,
    pub page: u64,
    pub page_size: u64,
}

impl Default for ArkQuery {
    fn default() -> Self {
        Self {
            filter: None,
            sort: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ArkQuery {
    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.page_size)
    }

    /// Pages needed to hold `total_results` records
    pub fn total_pages(&self, total_results: u64) -> u64 {
        total_results.div_ceil(self.page_size.max(1))
    }
}

/// One page of results plus the filtered total
#[derive(Debug, Clone)]
pub struct ArkPage {
    pub records: Vec<ArkRecord>,
    pub total_results: u64,
}
