//! Handlers for the `/indirizzi` (study track) resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use orientati_core::error::CoreError;
use orientati_core::listing::ListParams;
use orientati_core::types::DbId;
use orientati_db::models::indirizzo::{CreateIndirizzo, Indirizzo, UpdateIndirizzo};
use orientati_db::repositories::{IndirizzoRepo, ScuolaRepo};
use orientati_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::response::{ListResponse, MessageResponse, NoFilters};
use crate::state::AppState;

const ENTITY: &str = "Indirizzo";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

async fn ensure_scuola_exists(pool: &DbPool, scuola_id: DbId) -> AppResult<()> {
    if ScuolaRepo::exists(pool, scuola_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Scuola",
            id: scuola_id,
        }))
    }
}

/// GET /api/v1/indirizzi
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> AppResult<Json<ListResponse<Indirizzo>>> {
    let query = params.validate()?;
    let page = IndirizzoRepo::list(&state.pool, &query).await?;
    Ok(Json(ListResponse::new(page, &query, NoFilters {})))
}

/// POST /api/v1/indirizzi
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateIndirizzo>,
) -> AppResult<(StatusCode, Json<Indirizzo>)> {
    ensure_scuola_exists(&state.pool, input.id_scuola).await?;
    let indirizzo = IndirizzoRepo::create(&state.pool, &input).await?;
    tracing::info!(
        indirizzo_id = indirizzo.id,
        scuola_id = indirizzo.id_scuola,
        "Indirizzo created"
    );
    Ok((StatusCode::CREATED, Json(indirizzo)))
}

/// GET /api/v1/indirizzi/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<Indirizzo>> {
    let indirizzo = IndirizzoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(indirizzo))
}

/// PUT /api/v1/indirizzi/{id}
pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
    ValidJson(input): ValidJson<UpdateIndirizzo>,
) -> AppResult<Json<Indirizzo>> {
    if !IndirizzoRepo::exists(&state.pool, id).await? {
        return Err(not_found(id));
    }
    ensure_scuola_exists(&state.pool, input.id_scuola).await?;

    let indirizzo = IndirizzoRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(indirizzo))
}

/// DELETE /api/v1/indirizzi/{id}
///
/// Subject links go with the track; the subjects themselves stay.
pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !IndirizzoRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(indirizzo_id = id, "Indirizzo deleted");
    Ok(Json(MessageResponse::new(format!("Indirizzo {id} deleted"))))
}
