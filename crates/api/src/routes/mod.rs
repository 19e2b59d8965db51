pub mod citta;
pub mod health;
pub mod indirizzo;
pub mod materia;
pub mod scuola;

use axum::Router;

use crate::state::AppState;

/// Build the resource route tree nested under the configured API prefix.
///
/// Route hierarchy:
///
/// ```text
/// /citta                                            list, create
/// /citta/{id}                                       get, replace, delete
/// /citta/zipcode/{zipcode}                          get by postal code
///
/// /schools                                          list, create
/// /schools/{id}                                     get, merge, delete
///
/// /indirizzi                                        list, create
/// /indirizzi/{id}                                   get, replace, delete
///
/// /materie                                          list, create
/// /materie/{id}                                     get, replace, delete
/// /materie/link-indirizzo/{materia_id}/{indirizzo_id}  link (POST), unlink (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/citta", citta::router())
        .nest("/schools", scuola::router())
        .nest("/indirizzi", indirizzo::router())
        .nest("/materie", materia::router())
}
