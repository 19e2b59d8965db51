//! Shared building blocks for filtered, sorted, paginated list queries.
//!
//! Every list operation runs two statements built from the same filters:
//! a `COUNT(*)` for the filtered total and a `SELECT` with `ORDER BY`,
//! `LIMIT` and `OFFSET` for the page. Keeping them separate means the
//! reported total never shrinks because of pagination.
//!
//! User input only ever reaches SQL through `push_bind`; sort columns are
//! `&'static str` values taken from a whitelist.

use orientati_core::listing::SortOrder;
use sqlx::{Postgres, QueryBuilder};

/// Tracks whether the next condition needs `WHERE` or `AND`.
#[derive(Debug, Default)]
pub struct WhereClause {
    has_where: bool,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the `WHERE`/`AND` keyword and hand the builder back.
    pub fn and<'b, 'args>(
        &mut self,
        builder: &'b mut QueryBuilder<'args, Postgres>,
    ) -> &'b mut QueryBuilder<'args, Postgres> {
        if self.has_where {
            builder.push(" AND ");
        } else {
            self.has_where = true;
            builder.push(" WHERE ");
        }
        builder
    }

    /// `column ILIKE '%term%'`, with LIKE wildcards in `term` escaped.
    pub fn contains(
        &mut self,
        builder: &mut QueryBuilder<'_, Postgres>,
        column: &'static str,
        term: &str,
    ) {
        self.and(builder)
            .push(column)
            .push(" ILIKE ")
            .push_bind(contains_pattern(term));
    }

    /// `column = value`.
    pub fn equals(
        &mut self,
        builder: &mut QueryBuilder<'_, Postgres>,
        column: &'static str,
        value: &str,
    ) {
        self.and(builder)
            .push(column)
            .push(" = ")
            .push_bind(value.to_string());
    }
}

/// Build a `%term%` pattern, escaping `\`, `%` and `_` so the term matches
/// literally (PostgreSQL's default LIKE escape character is `\`).
pub fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Append `ORDER BY <sort> <dir>, <pk> ASC LIMIT $n OFFSET $m`.
///
/// The primary key is always the secondary sort key so pages are stable
/// when the primary column has duplicates.
pub fn push_order_and_page(
    builder: &mut QueryBuilder<'_, Postgres>,
    sort_column: &'static str,
    order: SortOrder,
    pk_column: &'static str,
    limit: i64,
    offset: i64,
) {
    builder
        .push(" ORDER BY ")
        .push(sort_column)
        .push(" ")
        .push(order.as_sql())
        .push(", ")
        .push(pk_column)
        .push(" ASC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
}
