//! Pagination, search and sort helpers shared by every list endpoint.
//!
//! The request layer deserializes raw query parameters into [`ListParams`]
//! and calls [`ListParams::validate`], which enforces the limit/offset
//! ranges and the `asc`/`desc` order enum. The repository layer then turns
//! the validated [`ListQuery`] into SQL, resolving `sort_by` against a
//! static whitelist with [`resolve_sort_column`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of items per page.
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Maximum number of items per page.
pub const MAX_LIST_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

/// Direction of the primary sort column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a user-supplied order. Only `asc` and `desc` are accepted.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CoreError::Validation(format!(
                "order must be 'asc' or 'desc', got '{other}'"
            ))),
        }
    }

    /// SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Raw list parameters (`?limit=&offset=&search=&sort_by=&order=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Validated list parameters, ready for query building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: i64,
    pub offset: i64,
    /// Trimmed search term; blank input is dropped.
    pub search: Option<String>,
    /// The sort key exactly as supplied. Unknown keys are resolved later.
    pub sort_by: Option<String>,
    pub order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
            search: None,
            sort_by: None,
            order: SortOrder::Asc,
        }
    }
}

impl ListParams {
    /// Range-check `limit` (1..=100) and `offset` (>= 0), parse `order`
    /// and reject a search term containing NUL.
    ///
    /// Out-of-range values are rejected rather than clamped.
    pub fn validate(self) -> Result<ListQuery, CoreError> {
        let limit = self.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            return Err(CoreError::Validation(format!(
                "limit must be between 1 and {MAX_LIST_LIMIT}, got {limit}"
            )));
        }

        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(CoreError::Validation(format!(
                "offset must be zero or positive, got {offset}"
            )));
        }

        let order = match self.order.as_deref() {
            Some(value) => SortOrder::parse(value)?,
            None => SortOrder::Asc,
        };

        let search = normalize_filter(self.search);
        if search.as_deref().is_some_and(|term| term.contains('\0')) {
            return Err(CoreError::Validation(
                "search must not contain NUL characters".into(),
            ));
        }

        Ok(ListQuery {
            limit,
            offset,
            search,
            sort_by: self.sort_by,
            order,
        })
    }
}

/// Trim a free-text filter and drop it entirely when blank.
pub fn normalize_filter(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Map a user-facing sort key to a whitelisted SQL column expression.
///
/// `columns` pairs each accepted key with its column. Missing or unknown
/// keys fall back to `default`, so a bad `sort_by` never reaches SQL.
pub fn resolve_sort_column(
    sort_by: Option<&str>,
    columns: &[(&str, &'static str)],
    default: &'static str,
) -> &'static str {
    sort_by
        .and_then(|key| {
            columns
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, column)| *column)
        })
        .unwrap_or(default)
}

/// One page of a filtered collection plus the filtered total.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    /// Number of rows matching the filters, ignoring limit/offset.
    pub total: i64,
}

impl<T> ListPage<T> {
    /// Transform every item while keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
