//! A complete client request: filter, ordering and paging.

use tracing::debug;

use crate::ast::{Filter, SortInfo};
use crate::catalog::ColumnCatalog;
use crate::error::Result;
use crate::evaluator::{Record, compare_records};
use crate::parser::{parse_filter, parse_order_by};

/// A parsed request ready to run against an in-memory collection.
///
/// # Examples
///
/// ```
/// use sift_lang::{Catalog, Column, FieldType, Query};
/// use serde_json::json;
///
/// let catalog = Catalog::builder("employees")
///     .column(Column::new("id", FieldType::Integer))
///     .column(Column::new("name", FieldType::String))
///     .build()
///     .unwrap();
///
/// let records = vec![
///     json!({ "id": 1, "name": "Bob" }),
///     json!({ "id": 2, "name": "Alice" }),
///     json!({ "id": 3, "name": "Carol" }),
/// ];
///
/// let query = Query::parse(&catalog, "id gt 1", "name asc").unwrap();
/// let names: Vec<_> = query.apply(&records).iter().map(|r| r["name"].clone()).collect();
/// assert_eq!(names, vec![json!("Alice"), json!("Carol")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub order_by: Vec<SortInfo>,
    /// Records per page; `None` returns everything.
    pub page_size: Option<usize>,
    /// 0-based page index, ignored without a page size.
    pub page_number: usize,
}

impl Query {
    /// Parse a filter and an order-by expression. Either may be empty.
    pub fn parse<C: ColumnCatalog + ?Sized>(catalog: &C, filter: &str, order_by: &str) -> Result<Self> {
        Ok(Query {
            filter: parse_filter(filter, catalog)?,
            order_by: parse_order_by(order_by, catalog)?,
            page_size: None,
            page_number: 0,
        })
    }

    pub fn with_page(mut self, page_size: usize, page_number: usize) -> Self {
        self.page_size = Some(page_size);
        self.page_number = page_number;
        self
    }

    /// Filter, then stably sort, then page.
    pub fn apply<'r, R: Record>(&self, records: &'r [R]) -> Vec<&'r R> {
        let mut matched = self.filter.filter_records(records);
        if !self.order_by.is_empty() {
            matched.sort_by(|a, b| compare_records(*a, *b, &self.order_by));
        }

        let total = matched.len();
        let page = match self.page_size {
            Some(size) => matched
                .into_iter()
                .skip(size.saturating_mul(self.page_number))
                .take(size)
                .collect(),
            None => matched,
        };

        debug!(
            scanned = records.len(),
            matched = total,
            returned = page.len(),
            "applied query"
        );
        page
    }
}
