//! Route definitions for the `/materie` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::materia;
use crate::state::AppState;

/// Routes mounted at `/materie`.
///
/// ```text
/// GET    /                                           -> list
/// POST   /                                           -> create
/// GET    /{id}                                       -> get_by_id
/// PUT    /{id}                                       -> update
/// DELETE /{id}                                       -> delete
/// POST   /link-indirizzo/{materia_id}/{indirizzo_id} -> link_indirizzo
/// DELETE /link-indirizzo/{materia_id}/{indirizzo_id} -> unlink_indirizzo
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(materia::list).post(materia::create))
        .route(
            "/{id}",
            get(materia::get_by_id)
                .put(materia::update)
                .delete(materia::delete),
        )
        .route(
            "/link-indirizzo/{materia_id}/{indirizzo_id}",
            post(materia::link_indirizzo).delete(materia::unlink_indirizzo),
        )
}
