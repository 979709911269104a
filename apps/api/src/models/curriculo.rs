use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored résumé row from the `curriculo` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Curriculo {
    pub id: i32,
    pub nome: String,
    pub email: String,
    pub contato: String,
    pub formacao: String,
    pub experiencia: String,
}

/// Writable fields of a résumé. Every field is required on create and
/// update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculoInput {
    pub nome: String,
    pub email: String,
    pub contato: String,
    pub formacao: String,
    pub experiencia: String,
}

impl CurriculoInput {
    /// Rejects blank identifying fields. The remaining fields may be empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.nome.trim().is_empty() {
            return Err("nome must not be blank".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("email must not be blank".to_string());
        }
        Ok(())
    }
}
