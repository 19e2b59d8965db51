//! Repository for the `scuole` table.
//!
//! Every read joins `citta` so callers get a [`ScuolaWithCitta`] and can
//! flatten the city into the response.

use orientati_core::listing::{resolve_sort_column, ListPage, ListQuery};
use orientati_core::types::DbId;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::list::{push_order_and_page, WhereClause};
use crate::models::scuola::{CreateScuola, ScuolaFilters, ScuolaWithCitta, UpdateScuola};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "s.id, s.nome, s.tipo, s.indirizzo, s.email_contatto, \
    s.telefono_contatto, s.sito_web, s.descrizione, s.citta_id, s.created_at, s.updated_at, \
    c.nome AS citta_nome, c.provincia AS citta_provincia, c.cap AS citta_cap";

/// Accepted `sort_by` keys. Anything else sorts by name.
const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "s.nome"),
    ("nome", "s.nome"),
    ("tipo", "s.tipo"),
    ("citta", "c.nome"),
    ("provincia", "c.provincia"),
    ("created_at", "s.created_at"),
];

/// Provides CRUD operations for schools.
pub struct ScuolaRepo;

impl ScuolaRepo {
    /// Insert a new school and return it joined with its city.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScuola,
    ) -> Result<ScuolaWithCitta, sqlx::Error> {
        let query = format!(
            "WITH s AS (
                INSERT INTO scuole
                    (nome, tipo, indirizzo, email_contatto, telefono_contatto,
                     sito_web, descrizione, citta_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
             )
             SELECT {COLUMNS} FROM s JOIN citta c ON c.id = s.citta_id"
        );
        sqlx::query_as::<_, ScuolaWithCitta>(&query)
            .bind(&input.nome)
            .bind(&input.tipo)
            .bind(&input.indirizzo)
            .bind(&input.email_contatto)
            .bind(&input.telefono_contatto)
            .bind(&input.sito_web)
            .bind(&input.descrizione)
            .bind(input.citta_id)
            .fetch_one(pool)
            .await
    }

    /// Find a school by its internal ID.
    pub async fn find_by_id<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<ScuolaWithCitta>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM scuole s JOIN citta c ON c.id = s.citta_id WHERE s.id = $1"
        );
        sqlx::query_as::<_, ScuolaWithCitta>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Whether a school with this ID exists.
    pub async fn exists<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM scuole WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// List one page of schools plus the filtered total.
    pub async fn list(
        pool: &PgPool,
        query: &ListQuery,
        filters: &ScuolaFilters,
    ) -> Result<ListPage<ScuolaWithCitta>, sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM scuole s JOIN citta c ON c.id = s.citta_id",
        );
        push_filters(&mut count, query, filters);
        let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM scuole s JOIN citta c ON c.id = s.citta_id"
        ));
        push_filters(&mut select, query, filters);
        push_order_and_page(
            &mut select,
            resolve_sort_column(query.sort_by.as_deref(), SORT_COLUMNS, "s.nome"),
            query.order,
            "s.id",
            query.limit,
            query.offset,
        );
        let items = select
            .build_query_as::<ScuolaWithCitta>()
            .fetch_all(pool)
            .await?;

        Ok(ListPage { items, total })
    }

    /// Merge the supplied fields into an existing school.
    ///
    /// Absent or null scalar fields keep their stored value. `sito_web` and
    /// `descrizione` are overwritten whenever present, so `null` clears them.
    /// `updated_at` is refreshed by the `set_updated_at` trigger.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateScuola,
    ) -> Result<Option<ScuolaWithCitta>, sqlx::Error> {
        let query = format!(
            "WITH s AS (
                UPDATE scuole SET
                    nome = COALESCE($2, nome),
                    tipo = COALESCE($3, tipo),
                    indirizzo = COALESCE($4, indirizzo),
                    citta_id = COALESCE($5, citta_id),
                    email_contatto = COALESCE($6, email_contatto),
                    telefono_contatto = COALESCE($7, telefono_contatto),
                    sito_web = CASE WHEN $8 THEN $9 ELSE sito_web END,
                    descrizione = CASE WHEN $10 THEN $11 ELSE descrizione END
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM s JOIN citta c ON c.id = s.citta_id"
        );
        sqlx::query_as::<_, ScuolaWithCitta>(&query)
            .bind(id)
            .bind(&input.nome)
            .bind(&input.tipo)
            .bind(&input.indirizzo)
            .bind(input.citta_id)
            .bind(&input.email_contatto)
            .bind(&input.telefono_contatto)
            .bind(input.sito_web.is_some())
            .bind(input.sito_web.clone().flatten())
            .bind(input.descrizione.is_some())
            .bind(input.descrizione.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a school together with its study tracks and their
    /// subject links. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scuole WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    query: &ListQuery,
    filters: &ScuolaFilters,
) {
    let mut clause = WhereClause::new();
    if let Some(search) = query.search.as_deref() {
        clause.contains(builder, "s.nome", search);
    }
    if let Some(tipo) = filters.tipo.as_deref() {
        clause.equals(builder, "s.tipo", tipo);
    }
    if let Some(citta) = filters.citta.as_deref() {
        clause.equals(builder, "c.nome", citta);
    }
    if let Some(provincia) = filters.provincia.as_deref() {
        clause.equals(builder, "c.provincia", provincia);
    }
    if let Some(indirizzo) = filters.indirizzo.as_deref() {
        clause.contains(builder, "s.indirizzo", indirizzo);
    }
}
