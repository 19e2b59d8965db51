//! Route definitions for the `/citta` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::citta;
use crate::state::AppState;

/// Routes mounted at `/citta`.
///
/// ```text
/// GET    /                   -> list
/// POST   /                   -> create
/// GET    /{id}               -> get_by_id
/// PUT    /{id}               -> update
/// DELETE /{id}               -> delete
/// GET    /zipcode/{zipcode}  -> get_by_zipcode
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(citta::list).post(citta::create))
        .route(
            "/{id}",
            get(citta::get_by_id)
                .put(citta::update)
                .delete(citta::delete),
        )
        .route("/zipcode/{zipcode}", get(citta::get_by_zipcode))
}
