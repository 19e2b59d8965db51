//! Repository for the `indirizzi` (study track) table.

use orientati_core::listing::{resolve_sort_column, ListPage, ListQuery};
use orientati_core::types::DbId;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::list::{push_order_and_page, WhereClause};
use crate::models::indirizzo::{
    CreateIndirizzo, Indirizzo, IndirizzoMateriaName, UpdateIndirizzo,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "i.id, i.nome, i.descrizione, i.scuola_id AS id_scuola";

/// Accepted `sort_by` keys. Anything else sorts by name.
const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "i.nome"),
    ("nome", "i.nome"),
    ("scuola", "i.scuola_id"),
];

/// Provides CRUD operations for study tracks.
pub struct IndirizzoRepo;

impl IndirizzoRepo {
    /// Insert a new study track, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateIndirizzo,
    ) -> Result<Indirizzo, sqlx::Error> {
        sqlx::query_as::<_, Indirizzo>(
            "INSERT INTO indirizzi (nome, descrizione, scuola_id) VALUES ($1, $2, $3)
             RETURNING id, nome, descrizione, scuola_id AS id_scuola",
        )
        .bind(&input.nome)
        .bind(&input.descrizione)
        .bind(input.id_scuola)
        .fetch_one(pool)
        .await
    }

    /// Find a study track by its internal ID.
    pub async fn find_by_id<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<Indirizzo>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM indirizzi i WHERE i.id = $1");
        sqlx::query_as::<_, Indirizzo>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Whether a study track with this ID exists.
    pub async fn exists<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM indirizzi WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// List one page of study tracks plus the filtered total.
    pub async fn list(
        pool: &PgPool,
        query: &ListQuery,
    ) -> Result<ListPage<Indirizzo>, sqlx::Error> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM indirizzi i");
        push_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM indirizzi i"));
        push_filters(&mut select, query);
        push_order_and_page(
            &mut select,
            resolve_sort_column(query.sort_by.as_deref(), SORT_COLUMNS, "i.nome"),
            query.order,
            "i.id",
            query.limit,
            query.offset,
        );
        let items = select.build_query_as::<Indirizzo>().fetch_all(pool).await?;

        Ok(ListPage { items, total })
    }

    /// All study tracks of the given schools, ordered by name then id.
    pub async fn list_by_scuole(
        pool: &PgPool,
        scuola_ids: &[DbId],
    ) -> Result<Vec<Indirizzo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM indirizzi i
             WHERE i.scuola_id = ANY($1)
             ORDER BY i.nome, i.id"
        );
        sqlx::query_as::<_, Indirizzo>(&query)
            .bind(scuola_ids)
            .fetch_all(pool)
            .await
    }

    /// Names of the subjects linked to each of the given study tracks,
    /// ordered by name within each track.
    pub async fn materia_names(
        pool: &PgPool,
        indirizzo_ids: &[DbId],
    ) -> Result<Vec<IndirizzoMateriaName>, sqlx::Error> {
        sqlx::query_as::<_, IndirizzoMateriaName>(
            "SELECT im.indirizzo_id, m.nome
             FROM indirizzi_materie im
             JOIN materie m ON m.id = im.materia_id
             WHERE im.indirizzo_id = ANY($1)
             ORDER BY im.indirizzo_id, m.nome, m.id",
        )
        .bind(indirizzo_ids)
        .fetch_all(pool)
        .await
    }

    /// Replace every editable field of a study track.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateIndirizzo,
    ) -> Result<Option<Indirizzo>, sqlx::Error> {
        sqlx::query_as::<_, Indirizzo>(
            "UPDATE indirizzi SET nome = $2, descrizione = $3, scuola_id = $4
             WHERE id = $1
             RETURNING id, nome, descrizione, scuola_id AS id_scuola",
        )
        .bind(id)
        .bind(&input.nome)
        .bind(&input.descrizione)
        .bind(input.id_scuola)
        .fetch_optional(pool)
        .await
    }

    /// Permanently delete a study track and its subject links.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM indirizzi WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ListQuery) {
    let mut clause = WhereClause::new();
    if let Some(search) = query.search.as_deref() {
        clause.contains(builder, "i.nome", search);
    }
}
