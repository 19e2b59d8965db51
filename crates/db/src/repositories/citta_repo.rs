//! Repository for the `citta` table.

use orientati_core::listing::{resolve_sort_column, ListPage, ListQuery};
use orientati_core::types::DbId;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::list::{push_order_and_page, WhereClause};
use crate::models::citta::{Citta, CreateCitta, UpdateCitta};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "c.id, c.nome, c.provincia, c.cap, c.regione";

/// Accepted `sort_by` keys. Anything else sorts by name.
const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "c.nome"),
    ("nome", "c.nome"),
    ("provincia", "c.provincia"),
    ("regione", "c.regione"),
    ("cap", "c.cap"),
];

/// Provides CRUD operations for cities.
pub struct CittaRepo;

impl CittaRepo {
    /// Insert a new city, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCitta) -> Result<Citta, sqlx::Error> {
        sqlx::query_as::<_, Citta>(
            "INSERT INTO citta (nome, provincia, cap, regione)
             VALUES ($1, $2, $3, $4)
             RETURNING id, nome, provincia, cap, regione",
        )
        .bind(&input.nome)
        .bind(&input.provincia)
        .bind(&input.cap)
        .bind(&input.regione)
        .fetch_one(pool)
        .await
    }

    /// Find a city by its internal ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Citta>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM citta c WHERE c.id = $1");
        sqlx::query_as::<_, Citta>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a city by postal code. When several share it, the lowest id wins.
    pub async fn find_by_cap(pool: &PgPool, cap: &str) -> Result<Option<Citta>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM citta c WHERE c.cap = $1 ORDER BY c.id LIMIT 1");
        sqlx::query_as::<_, Citta>(&query)
            .bind(cap)
            .fetch_optional(pool)
            .await
    }

    /// Whether a city with this ID exists.
    pub async fn exists<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM citta WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// List one page of cities plus the filtered total.
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<ListPage<Citta>, sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM citta c");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM citta c"));
        push_filters(&mut select, query);
        push_order_and_page(
            &mut select,
            resolve_sort_column(query.sort_by.as_deref(), SORT_COLUMNS, "c.nome"),
            query.order,
            "c.id",
            query.limit,
            query.offset,
        );
        let items = select.build_query_as::<Citta>().fetch_all(pool).await?;

        Ok(ListPage { items, total })
    }

    /// Replace every editable field of a city.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCitta,
    ) -> Result<Option<Citta>, sqlx::Error> {
        sqlx::query_as::<_, Citta>(
            "UPDATE citta SET nome = $2, provincia = $3, cap = $4, regione = $5
             WHERE id = $1
             RETURNING id, nome, provincia, cap, regione",
        )
        .bind(id)
        .bind(&input.nome)
        .bind(&input.provincia)
        .bind(&input.cap)
        .bind(&input.regione)
        .fetch_optional(pool)
        .await
    }

    /// Number of schools located in this city.
    pub async fn count_scuole<'e, E>(executor: E, id: DbId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scuole WHERE citta_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// Permanently delete a city by ID. Returns `true` if a row was removed.
    pub async fn delete<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM citta WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ListQuery) {
    let mut clause = WhereClause::new();
    if let Some(search) = query.search.as_deref() {
        clause.contains(builder, "c.nome", search);
    }
}
