//! Study-track ("indirizzo") entity model and DTOs.
//!
//! Not to be confused with the street-address `indirizzo` column on schools.

use orientati_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `indirizzi` table. `scuola_id` is exposed as `id_scuola`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Indirizzo {
    pub id: DbId,
    pub nome: String,
    pub descrizione: Option<String>,
    pub id_scuola: DbId,
}

/// DTO for creating a new study track.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIndirizzo {
    #[validate(length(min = 1, message = "nome must not be empty"))]
    pub nome: String,
    pub descrizione: Option<String>,
    pub id_scuola: DbId,
}

/// DTO for replacing a study track.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateIndirizzo {
    #[validate(length(min = 1, message = "nome must not be empty"))]
    pub nome: String,
    pub descrizione: Option<String>,
    pub id_scuola: DbId,
}

/// A subject name attached to a study track, used when flattening schools.
#[derive(Debug, Clone, FromRow)]
pub struct IndirizzoMateriaName {
    pub indirizzo_id: DbId,
    pub nome: String,
}
