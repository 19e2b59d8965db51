//! Handlers for the `/materie` (subject) resource and its links to study
//! tracks.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use orientati_core::error::CoreError;
use orientati_core::listing::{ListPage, ListParams};
use orientati_core::types::DbId;
use orientati_db::models::materia::{CreateMateria, Materia, UpdateMateria};
use orientati_db::repositories::{IndirizzoRepo, MateriaRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::response::{ListResponse, MessageResponse, NoFilters};
use crate::state::AppState;

const ENTITY: &str = "Materia";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// A subject with the ids of the study tracks it is linked to.
#[derive(Debug, Serialize)]
pub struct MateriaResponse {
    pub id: DbId,
    pub nome: String,
    pub descrizione: Option<String>,
    /// Linked study track ids, ascending.
    pub indirizzi: Vec<DbId>,
}

impl MateriaResponse {
    fn new(materia: Materia, indirizzi: Vec<DbId>) -> Self {
        Self {
            id: materia.id,
            nome: materia.nome,
            descrizione: materia.descrizione,
            indirizzi,
        }
    }
}

/// GET /api/v1/materie
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> AppResult<Json<ListResponse<MateriaResponse>>> {
    let query = params.validate()?;
    let page = MateriaRepo::list(&state.pool, &query).await?;

    let ids: Vec<DbId> = page.items.iter().map(|m| m.id).collect();
    let mut links: HashMap<DbId, Vec<DbId>> = HashMap::new();
    if !ids.is_empty() {
        let pairs = MateriaRepo::linked_indirizzo_ids_for(&state.pool, &ids).await?;
        for (materia_id, indirizzo_id) in pairs {
            links.entry(materia_id).or_default().push(indirizzo_id);
        }
    }

    let page: ListPage<MateriaResponse> = page.map(|m| {
        let indirizzi = links.remove(&m.id).unwrap_or_default();
        MateriaResponse::new(m, indirizzi)
    });
    Ok(Json(ListResponse::new(page, &query, NoFilters {})))
}

/// POST /api/v1/materie
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateMateria>,
) -> AppResult<(StatusCode, Json<MateriaResponse>)> {
    let materia = MateriaRepo::create(&state.pool, &input).await?;
    tracing::info!(materia_id = materia.id, nome = %materia.nome, "Materia created");
    Ok((StatusCode::CREATED, Json(MateriaResponse::new(materia, Vec::new()))))
}

/// GET /api/v1/materie/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<MateriaResponse>> {
    let materia = MateriaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let indirizzi = MateriaRepo::linked_indirizzo_ids(&state.pool, id).await?;
    Ok(Json(MateriaResponse::new(materia, indirizzi)))
}

/// PUT /api/v1/materie/{id}
pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
    ValidJson(input): ValidJson<UpdateMateria>,
) -> AppResult<Json<MateriaResponse>> {
    let materia = MateriaRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    let indirizzi = MateriaRepo::linked_indirizzo_ids(&state.pool, id).await?;
    Ok(Json(MateriaResponse::new(materia, indirizzi)))
}

/// DELETE /api/v1/materie/{id}
///
/// Refused with 409 while the subject is linked to any study track.
pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let mut tx = state.pool.begin().await?;

    if MateriaRepo::find_by_id(&mut *tx, id).await?.is_none() {
        return Err(not_found(id));
    }
    let links = MateriaRepo::count_links(&mut *tx, id).await?;
    if links > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Materia {id} is linked to {links} indirizzi and cannot be deleted"
        ))));
    }
    MateriaRepo::delete(&mut *tx, id).await?;
    tx.commit().await?;

    tracing::info!(materia_id = id, "Materia deleted");
    Ok(Json(MessageResponse::new(format!("Materia {id} deleted"))))
}

/// POST /api/v1/materie/link-indirizzo/{materia_id}/{indirizzo_id}
pub async fn link_indirizzo(
    State(state): State<AppState>,
    ValidPath((materia_id, indirizzo_id)): ValidPath<(DbId, DbId)>,
) -> AppResult<Json<MateriaResponse>> {
    let mut tx = state.pool.begin().await?;

    let materia = MateriaRepo::find_by_id(&mut *tx, materia_id)
        .await?
        .ok_or_else(|| not_found(materia_id))?;
    if !IndirizzoRepo::exists(&mut *tx, indirizzo_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Indirizzo",
            id: indirizzo_id,
        }));
    }
    if !MateriaRepo::link(&mut *tx, materia_id, indirizzo_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Materia {materia_id} is already linked to indirizzo {indirizzo_id}"
        ))));
    }
    let indirizzi = MateriaRepo::linked_indirizzo_ids(&mut *tx, materia_id).await?;
    tx.commit().await?;

    tracing::info!(materia_id, indirizzo_id, "Materia linked to indirizzo");
    Ok(Json(MateriaResponse::new(materia, indirizzi)))
}

/// DELETE /api/v1/materie/link-indirizzo/{materia_id}/{indirizzo_id}
pub async fn unlink_indirizzo(
    State(state): State<AppState>,
    ValidPath((materia_id, indirizzo_id)): ValidPath<(DbId, DbId)>,
) -> AppResult<Json<MateriaResponse>> {
    let mut tx = state.pool.begin().await?;

    let materia = MateriaRepo::find_by_id(&mut *tx, materia_id)
        .await?
        .ok_or_else(|| not_found(materia_id))?;
    if !IndirizzoRepo::exists(&mut *tx, indirizzo_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Indirizzo",
            id: indirizzo_id,
        }));
    }
    if !MateriaRepo::unlink(&mut *tx, materia_id, indirizzo_id).await? {
        return Err(AppError::Core(CoreError::NotFoundBy {
            entity: "Link",
            field: "materia/indirizzo",
            value: format!("{materia_id}/{indirizzo_id}"),
        }));
    }
    let indirizzi = MateriaRepo::linked_indirizzo_ids(&mut *tx, materia_id).await?;
    tx.commit().await?;

    tracing::info!(materia_id, indirizzo_id, "Materia unlinked from indirizzo");
    Ok(Json(MateriaResponse::new(materia, indirizzi)))
}
