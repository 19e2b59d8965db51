//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Single-statement methods accept any [`sqlx::PgExecutor`] so they can run
//! on the pool or inside a caller's transaction.

pub mod citta_repo;
pub mod indirizzo_repo;
pub mod materia_repo;
pub mod scuola_repo;

pub use citta_repo::CittaRepo;
pub use indirizzo_repo::IndirizzoRepo;
pub use materia_repo::MateriaRepo;
pub use scuola_repo::ScuolaRepo;
