//! Filter selections and pagination.
//!
//! The caller owns the current selection and passes it in on every
//! recomputation; nothing here holds state between calls.

use chrono::NaiveDate;
use serde::Serialize;

use crate::date;
use crate::record::InventoryRecord;

/// A dropdown-style selection. An empty string means nothing is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Nothing,
    Value(String),
}

impl Selection {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Nothing => None,
            Self::Value(v) => Some(v),
        }
    }
}

impl From<Option<&str>> for Selection {
    fn from(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Self::Nothing,
            Some(v) => Self::Value(v.to_string()),
        }
    }
}

impl From<&str> for Selection {
    fn from(raw: &str) -> Self {
        Self::from(Some(raw))
    }
}

/// Inclusive order-date range. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// With no bound every record passes. Otherwise a record needs an order
    /// date that normalizes cleanly and falls inside the bounds.
    pub fn contains(&self, record: &InventoryRecord) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(day) = record.order_date.and_then(|s| date::to_naive_date(s).ok()) else {
            return false;
        };
        self.start.map_or(true, |start| start <= day) && self.end.map_or(true, |end| day <= end)
    }
}

/// Record predicate shared by every filtered aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    All,
    Category(String),
    Product(String),
    OrderDateRange(DateRange),
}

impl RecordFilter {
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => record.category_name == *name,
            Self::Product(name) => record.product_name == *name,
            Self::OrderDateRange(range) => range.contains(record),
        }
    }

    pub fn apply<'a>(&self, records: &'a [InventoryRecord]) -> Vec<&'a InventoryRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Rows per page on the summary table.
pub const SUMMARY_PAGE_SIZE: usize = 10;
/// Rows per page on the full record table.
pub const DETAIL_PAGE_SIZE: usize = 4;

/// Number of pages needed for `len` items; zero items need zero pages.
pub fn page_count(len: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    len.div_ceil(per_page)
}

/// One-based page of `items`. Page 0 and pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}
