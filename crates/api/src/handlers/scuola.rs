//! Handlers for the `/schools` resource.
//!
//! Schools are returned with their city flattened inline and their study
//! tracks embedded together with the names of each track's subjects.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use orientati_core::error::CoreError;
use orientati_core::listing::{ListPage, ListParams};
use orientati_core::types::{DbId, Timestamp};
use orientati_db::models::indirizzo::Indirizzo;
use orientati_db::models::scuola::{CreateScuola, ScuolaFilters, ScuolaWithCitta, UpdateScuola};
use orientati_db::repositories::{CittaRepo, IndirizzoRepo, ScuolaRepo};
use orientati_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::response::{ListResponse, MessageResponse};
use crate::state::AppState;

const ENTITY: &str = "Scuola";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// A school as returned by the API.
#[derive(Debug, Serialize)]
pub struct ScuolaResponse {
    pub id: DbId,
    pub nome: String,
    pub tipo: String,
    pub indirizzo: String,
    pub email_contatto: String,
    pub telefono_contatto: String,
    pub sito_web: Option<String>,
    pub descrizione: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(rename = "città")]
    pub citta: String,
    pub provincia: String,
    pub codice_postale: String,
    pub indirizzi_scuola: Vec<IndirizzoScuola>,
}

/// A study track embedded in a school.
#[derive(Debug, Serialize)]
pub struct IndirizzoScuola {
    pub id: DbId,
    pub nome: String,
    pub descrizione: Option<String>,
    /// Subject names, alphabetical.
    pub materie: Vec<String>,
}

/// Filter echo for the school list envelope.
#[derive(Debug, Serialize)]
pub struct ScuolaFilterEcho {
    pub filter_tipo: Option<String>,
    pub filter_citta: Option<String>,
    pub filter_provincia: Option<String>,
    pub filter_indirizzo: Option<String>,
}

impl From<ScuolaFilters> for ScuolaFilterEcho {
    fn from(filters: ScuolaFilters) -> Self {
        Self {
            filter_tipo: filters.tipo,
            filter_citta: filters.citta,
            filter_provincia: filters.provincia,
            filter_indirizzo: filters.indirizzo,
        }
    }
}

/// Attach tracks and subject names to a batch of schools.
///
/// Runs two queries regardless of how many schools are passed.
async fn shape(pool: &DbPool, rows: Vec<ScuolaWithCitta>) -> AppResult<Vec<ScuolaResponse>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let scuola_ids: Vec<DbId> = rows.iter().map(|s| s.id).collect();
    let indirizzi = IndirizzoRepo::list_by_scuole(pool, &scuola_ids).await?;

    let indirizzo_ids: Vec<DbId> = indirizzi.iter().map(|i| i.id).collect();
    let mut materie: HashMap<DbId, Vec<String>> = HashMap::new();
    if !indirizzo_ids.is_empty() {
        for row in IndirizzoRepo::materia_names(pool, &indirizzo_ids).await? {
            materie.entry(row.indirizzo_id).or_default().push(row.nome);
        }
    }

    let mut by_scuola: HashMap<DbId, Vec<IndirizzoScuola>> = HashMap::new();
    for Indirizzo {
        id,
        nome,
        descrizione,
        id_scuola,
    } in indirizzi
    {
        by_scuola.entry(id_scuola).or_default().push(IndirizzoScuola {
            id,
            nome,
            descrizione,
            materie: materie.remove(&id).unwrap_or_default(),
        });
    }

    Ok(rows
        .into_iter()
        .map(|s| ScuolaResponse {
            indirizzi_scuola: by_scuola.remove(&s.id).unwrap_or_default(),
            id: s.id,
            nome: s.nome,
            tipo: s.tipo,
            indirizzo: s.indirizzo,
            email_contatto: s.email_contatto,
            telefono_contatto: s.telefono_contatto,
            sito_web: s.sito_web,
            descrizione: s.descrizione,
            created_at: s.created_at,
            updated_at: s.updated_at,
            citta: s.citta_nome,
            provincia: s.citta_provincia,
            codice_postale: s.citta_cap,
        })
        .collect())
}

async fn shape_one(pool: &DbPool, row: ScuolaWithCitta) -> AppResult<ScuolaResponse> {
    let id = row.id;
    shape(pool, vec![row])
        .await?
        .pop()
        .ok_or_else(|| AppError::InternalError(format!("Shaping school {id} produced no row")))
}

async fn ensure_citta_exists(pool: &DbPool, citta_id: DbId) -> AppResult<()> {
    if CittaRepo::exists(pool, citta_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Citta",
            id: citta_id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/schools
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ListParams>,
    ValidQuery(filters): ValidQuery<ScuolaFilters>,
) -> AppResult<Json<ListResponse<ScuolaResponse, ScuolaFilterEcho>>> {
    let query = params.validate()?;
    let filters = filters.normalized();

    let page = ScuolaRepo::list(&state.pool, &query, &filters).await?;
    let total = page.total;
    let items = shape(&state.pool, page.items).await?;

    Ok(Json(ListResponse::new(
        ListPage { items, total },
        &query,
        filters.into(),
    )))
}

/// POST /api/v1/schools
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateScuola>,
) -> AppResult<(StatusCode, Json<ScuolaResponse>)> {
    ensure_citta_exists(&state.pool, input.citta_id).await?;
    let row = ScuolaRepo::create(&state.pool, &input).await?;
    tracing::info!(scuola_id = row.id, citta_id = row.citta_id, "Scuola created");
    Ok((StatusCode::CREATED, Json(shape_one(&state.pool, row).await?)))
}

/// GET /api/v1/schools/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<ScuolaResponse>> {
    let row = ScuolaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(shape_one(&state.pool, row).await?))
}

/// PUT /api/v1/schools/{id}
///
/// Selective merge: only the fields present in the body are written.
pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
    ValidJson(input): ValidJson<UpdateScuola>,
) -> AppResult<Json<ScuolaResponse>> {
    if !ScuolaRepo::exists(&state.pool, id).await? {
        return Err(not_found(id));
    }
    if let Some(citta_id) = input.citta_id {
        ensure_citta_exists(&state.pool, citta_id).await?;
    }

    let row = ScuolaRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(shape_one(&state.pool, row).await?))
}

/// DELETE /api/v1/schools/{id}
///
/// Also removes the school's study tracks and their subject links.
pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !ScuolaRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(scuola_id = id, "Scuola deleted");
    Ok(Json(MessageResponse::new(format!("Scuola {id} deleted"))))
}
