//! Repository for the `materie` table and its links to study tracks.

use orientati_core::listing::{resolve_sort_column, ListPage, ListQuery};
use orientati_core::types::DbId;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::list::{push_order_and_page, WhereClause};
use crate::models::materia::{CreateMateria, Materia, UpdateMateria};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "m.id, m.nome, m.descrizione";

/// Accepted `sort_by` keys. Anything else sorts by name.
const SORT_COLUMNS: &[(&str, &str)] = &[("name", "m.nome"), ("nome", "m.nome")];

/// Provides CRUD and link operations for subjects.
pub struct MateriaRepo;

impl MateriaRepo {
    /// Insert a new subject, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMateria) -> Result<Materia, sqlx::Error> {
        sqlx::query_as::<_, Materia>(
            "INSERT INTO materie (nome, descrizione) VALUES ($1, $2)
             RETURNING id, nome, descrizione",
        )
        .bind(&input.nome)
        .bind(&input.descrizione)
        .fetch_one(pool)
        .await
    }

    /// Find a subject by its internal ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Materia>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM materie m WHERE m.id = $1");
        sqlx::query_as::<_, Materia>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List one page of subjects plus the filtered total.
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<ListPage<Materia>, sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM materie m");
        push_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM materie m"));
        push_filters(&mut select, query);
        push_order_and_page(
            &mut select,
            resolve_sort_column(query.sort_by.as_deref(), SORT_COLUMNS, "m.nome"),
            query.order,
            "m.id",
            query.limit,
            query.offset,
        );
        let items = select.build_query_as::<Materia>().fetch_all(pool).await?;

        Ok(ListPage { items, total })
    }

    /// Replace name and description of a subject.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMateria,
    ) -> Result<Option<Materia>, sqlx::Error> {
        sqlx::query_as::<_, Materia>(
            "UPDATE materie SET nome = $2, descrizione = $3
             WHERE id = $1
             RETURNING id, nome, descrizione",
        )
        .bind(id)
        .bind(&input.nome)
        .bind(&input.descrizione)
        .fetch_optional(pool)
        .await
    }

    /// Permanently delete a subject by ID. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation while links remain; callers check
    /// [`count_links`](Self::count_links) first.
    pub async fn delete<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM materie WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Study-track links
    // -----------------------------------------------------------------------

    /// Number of study tracks linked to this subject.
    pub async fn count_links<'e, E>(executor: E, materia_id: DbId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM indirizzi_materie WHERE materia_id = $1")
            .bind(materia_id)
            .fetch_one(executor)
            .await
    }

    /// IDs of the study tracks linked to this subject, ascending.
    pub async fn linked_indirizzo_ids<'e, E>(
        executor: E,
        materia_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, DbId>(
            "SELECT indirizzo_id FROM indirizzi_materie
             WHERE materia_id = $1
             ORDER BY indirizzo_id",
        )
        .bind(materia_id)
        .fetch_all(executor)
        .await
    }

    /// IDs of the study tracks linked to each of the given subjects.
    pub async fn linked_indirizzo_ids_for(
        pool: &PgPool,
        materia_ids: &[DbId],
    ) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId)>(
            "SELECT materia_id, indirizzo_id FROM indirizzi_materie
             WHERE materia_id = ANY($1)
             ORDER BY materia_id, indirizzo_id",
        )
        .bind(materia_ids)
        .fetch_all(pool)
        .await
    }

    /// Link a subject to a study track. Returns `false` if already linked.
    pub async fn link<'e, E>(
        executor: E,
        materia_id: DbId,
        indirizzo_id: DbId,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "INSERT INTO indirizzi_materie (indirizzo_id, materia_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(indirizzo_id)
        .bind(materia_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a link. Returns `false` if the link did not exist.
    pub async fn unlink<'e, E>(
        executor: E,
        materia_id: DbId,
        indirizzo_id: DbId,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "DELETE FROM indirizzi_materie WHERE materia_id = $1 AND indirizzo_id = $2",
        )
        .bind(materia_id)
        .bind(indirizzo_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ListQuery) {
    let mut clause = WhereClause::new();
    if let Some(search) = query.search.as_deref() {
        clause.contains(builder, "m.nome", search);
    }
}
