//! School ("scuola") entity model and DTOs.

use orientati_core::listing::normalize_filter;
use orientati_core::nullable::deserialize_present;
use orientati_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A school row joined with the columns of its city.
///
/// Every school query selects this shape so the city can be flattened into
/// the response without a second round-trip.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScuolaWithCitta {
    pub id: DbId,
    pub nome: String,
    pub tipo: String,
    /// Street address.
    pub indirizzo: String,
    pub email_contatto: String,
    pub telefono_contatto: String,
    pub sito_web: Option<String>,
    pub descrizione: Option<String>,
    pub citta_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub citta_nome: String,
    pub citta_provincia: String,
    pub citta_cap: String,
}

/// DTO for creating a new school.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateScuola {
    #[validate(length(min = 1, message = "nome must not be empty"))]
    pub nome: String,
    pub tipo: String,
    pub indirizzo: String,
    #[validate(email(message = "email_contatto must be a valid email address"))]
    pub email_contatto: String,
    pub telefono_contatto: String,
    pub sito_web: Option<String>,
    pub descrizione: Option<String>,
    pub citta_id: DbId,
}

/// DTO for a selective merge into an existing school.
///
/// Plain `Option` fields are applied only when present and non-null.
/// `sito_web` and `descrizione` are applied whenever the key is present,
/// so an explicit `null` clears them.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateScuola {
    #[validate(length(min = 1, message = "nome must not be empty"))]
    pub nome: Option<String>,
    pub tipo: Option<String>,
    pub indirizzo: Option<String>,
    pub citta_id: Option<DbId>,
    #[validate(email(message = "email_contatto must be a valid email address"))]
    pub email_contatto: Option<String>,
    pub telefono_contatto: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub sito_web: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub descrizione: Option<Option<String>>,
}

/// School-specific list filters (`?tipo=&citta=&provincia=&indirizzo=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScuolaFilters {
    /// Exact match on school type.
    pub tipo: Option<String>,
    /// Exact match on the joined city name.
    pub citta: Option<String>,
    /// Exact match on the joined city province.
    pub provincia: Option<String>,
    /// Case-insensitive substring match on the street address.
    pub indirizzo: Option<String>,
}

impl ScuolaFilters {
    /// Trim every filter and drop blank ones.
    pub fn normalized(self) -> Self {
        Self {
            tipo: normalize_filter(self.tipo),
            citta: normalize_filter(self.citta),
            provincia: normalize_filter(self.provincia),
            indirizzo: normalize_filter(self.indirizzo),
        }
    }
}
