//! City entity model and DTOs.

use orientati_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `citta` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Citta {
    pub id: DbId,
    pub nome: String,
    pub provincia: String,
    /// Postal code, also used as an alternate lookup key.
    pub cap: String,
    pub regione: String,
}

/// DTO for creating a new city.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCitta {
    #[validate(length(min = 1, message = "nome must not be empty"))]
    pub nome: String,
    pub provincia: String,
    pub cap: String,
    pub regione: String,
}

/// DTO for replacing every editable field of a city.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCitta {
    #[validate(length(min = 1, message = "nome must not be empty"))]
    pub nome: String,
    pub provincia: String,
    pub cap: String,
    pub regione: String,
}
