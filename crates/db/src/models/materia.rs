//! Subject ("materia") entity model and DTOs.

use orientati_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `materie` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Materia {
    pub id: DbId,
    pub nome: String,
    pub descrizione: Option<String>,
}

/// DTO for creating a new subject.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMateria {
    #[validate(length(min = 1, message = "nome must not be empty"))]
    pub nome: String,
    pub descrizione: Option<String>,
}

/// DTO for replacing a subject. A missing `descrizione` clears it.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMateria {
    #[validate(length(min = 1, message = "nome must not be empty"))]
    pub nome: String,
    pub descrizione: Option<String>,
}
