pub mod citta;
pub mod indirizzo;
pub mod materia;
pub mod scuola;
