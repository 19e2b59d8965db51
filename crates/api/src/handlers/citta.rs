//! Handlers for the `/citta` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use orientati_core::error::CoreError;
use orientati_core::listing::ListParams;
use orientati_core::types::DbId;
use orientati_db::models::citta::{Citta, CreateCitta, UpdateCitta};
use orientati_db::repositories::CittaRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::response::{ListResponse, MessageResponse, NoFilters};
use crate::state::AppState;

const ENTITY: &str = "Citta";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// GET /api/v1/citta
pub async fn list(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> AppResult<Json<ListResponse<Citta>>> {
    let query = params.validate()?;
    let page = CittaRepo::list(&state.pool, &query).await?;
    Ok(Json(ListResponse::new(page, &query, NoFilters {})))
}

/// POST /api/v1/citta
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateCitta>,
) -> AppResult<(StatusCode, Json<Citta>)> {
    let citta = CittaRepo::create(&state.pool, &input).await?;
    tracing::info!(citta_id = citta.id, nome = %citta.nome, "Citta created");
    Ok((StatusCode::CREATED, Json(citta)))
}

/// GET /api/v1/citta/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<Citta>> {
    let citta = CittaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(citta))
}

/// GET /api/v1/citta/zipcode/{zipcode}
pub async fn get_by_zipcode(
    State(state): State<AppState>,
    ValidPath(zipcode): ValidPath<String>,
) -> AppResult<Json<Citta>> {
    let citta = CittaRepo::find_by_cap(&state.pool, &zipcode)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundBy {
            entity: ENTITY,
            field: "cap",
            value: zipcode,
        }))?;
    Ok(Json(citta))
}

/// PUT /api/v1/citta/{id}
pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
    ValidJson(input): ValidJson<UpdateCitta>,
) -> AppResult<Json<Citta>> {
    let citta = CittaRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(citta))
}

/// DELETE /api/v1/citta/{id}
///
/// Refused with 409 while schools still reference the city.
pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<MessageResponse>> {
    let mut tx = state.pool.begin().await?;

    if !CittaRepo::exists(&mut *tx, id).await? {
        return Err(not_found(id));
    }
    let scuole = CittaRepo::count_scuole(&mut *tx, id).await?;
    if scuole > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Citta {id} still has {scuole} schools and cannot be deleted"
        ))));
    }
    CittaRepo::delete(&mut *tx, id).await?;
    tx.commit().await?;

    tracing::info!(citta_id = id, "Citta deleted");
    Ok(Json(MessageResponse::new(format!("Citta {id} deleted"))))
}
