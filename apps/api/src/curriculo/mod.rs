//! Résumé resource: the protected CRUD surface and its persistence gateway.

pub mod handlers;
pub mod store;

pub use store::{CurriculoStore, PgCurriculoStore};
