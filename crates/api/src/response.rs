//! Shared response envelope types for API handlers.

use orientati_core::listing::{ListPage, ListQuery};
use serde::Serialize;

/// Envelope returned by every list endpoint.
///
/// `filters` is flattened into the top level so resource-specific filter
/// echoes (`filter_tipo`, ...) sit next to the common fields.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize, F: Serialize = NoFilters> {
    pub items: Vec<T>,
    /// Rows matching the filters, ignoring `limit`/`offset`.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub filter_search: Option<String>,
    pub sort_by: Option<String>,
    pub order: &'static str,
    #[serde(flatten)]
    pub filters: F,
}

/// No resource-specific filters.
#[derive(Debug, Default, Serialize)]
pub struct NoFilters {}

impl<T: Serialize, F: Serialize> ListResponse<T, F> {
    pub fn new(page: ListPage<T>, query: &ListQuery, filters: F) -> Self {
        Self {
            items: page.items,
            total: page.total,
            limit: query.limit,
            offset: query.offset,
            filter_search: query.search.clone(),
            sort_by: query.sort_by.clone(),
            order: query.order.as_str(),
            filters,
        }
    }
}

/// `{ "message": ... }` body returned by delete and unlink-style endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
