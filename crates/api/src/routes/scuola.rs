//! Route definitions for the `/schools` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::scuola;
use crate::state::AppState;

/// Routes mounted at `/schools`.
///
/// ```text
/// GET    /      -> list
/// POST   /      -> create
/// GET    /{id}  -> get_by_id
/// PUT    /{id}  -> update (selective merge)
/// DELETE /{id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scuola::list).post(scuola::create))
        .route(
            "/{id}",
            get(scuola::get_by_id)
                .put(scuola::update)
                .delete(scuola::delete),
        )
}
