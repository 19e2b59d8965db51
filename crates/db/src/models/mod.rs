//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (full replacement, or `Option` fields for merges)

pub mod citta;
pub mod indirizzo;
pub mod materia;
pub mod scuola;
