use axum::routing::get;
use axum::Router;

use crate::handlers::indirizzo;
use crate::state::AppState;

/// Routes mounted at `/indirizzi`.
///
/// ```text
/// GET    /      -> list
/// POST   /      -> create
/// GET    /{id}  -> get_by_id
/// PUT    /{id}  -> update
/// DELETE /{id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(indirizzo::list).post(indirizzo::create))
        .route(
            "/{id}",
            get(indirizzo::get_by_id)
                .put(indirizzo::update)
                .delete(indirizzo::delete),
        )
}
