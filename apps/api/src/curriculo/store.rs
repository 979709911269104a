//! Persistence gateway for résumé rows.
//!
//! Every statement binds each field as a discrete parameter (`$1..$n`);
//! nothing is interpolated into the SQL text.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::curriculo::{Curriculo, CurriculoInput};

pub type StoreError = sqlx::Error;

/// Carried in `AppState` as `Arc<dyn CurriculoStore>`.
#[async_trait]
pub trait CurriculoStore: Send + Sync {
    async fn create(&self, input: &CurriculoInput) -> Result<Curriculo, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Curriculo>, StoreError>;

    /// Exact match on `nome`, ordered by id.
    async fn find_by_nome(&self, nome: &str) -> Result<Vec<Curriculo>, StoreError>;

    async fn update(&self, id: i32, input: &CurriculoInput)
        -> Result<Option<Curriculo>, StoreError>;

    /// Returns `false` when no row had that id.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<Curriculo>, StoreError>;
}

pub struct PgCurriculoStore {
    pool: PgPool,
}

impl PgCurriculoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CurriculoStore for PgCurriculoStore {
    async fn create(&self, input: &CurriculoInput) -> Result<Curriculo, StoreError> {
        sqlx::query_as::<_, Curriculo>(
            r#"
            INSERT INTO curriculo (nome, email, contato, formacao, experiencia)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, nome, email, contato, formacao, experiencia
            "#,
        )
        .bind(&input.nome)
        .bind(&input.email)
        .bind(&input.contato)
        .bind(&input.formacao)
        .bind(&input.experiencia)
        .fetch_one(&self.pool)
        .await
    }

    async fn get(&self, id: i32) -> Result<Option<Curriculo>, StoreError> {
        sqlx::query_as::<_, Curriculo>(
            "SELECT id, nome, email, contato, formacao, experiencia FROM curriculo WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_by_nome(&self, nome: &str) -> Result<Vec<Curriculo>, StoreError> {
        sqlx::query_as::<_, Curriculo>(
            r#"
            SELECT id, nome, email, contato, formacao, experiencia
            FROM curriculo
            WHERE nome = $1
            ORDER BY id
            "#,
        )
        .bind(nome)
        .fetch_all(&self.pool)
        .await
    }

    async fn update(
        &self,
        id: i32,
        input: &CurriculoInput,
    ) -> Result<Option<Curriculo>, StoreError> {
        sqlx::query_as::<_, Curriculo>(
            r#"
            UPDATE curriculo
            SET nome = $1, email = $2, contato = $3, formacao = $4, experiencia = $5
            WHERE id = $6
            RETURNING id, nome, email, contato, formacao, experiencia
            "#,
        )
        .bind(&input.nome)
        .bind(&input.email)
        .bind(&input.contato)
        .bind(&input.formacao)
        .bind(&input.experiencia)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM curriculo WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Curriculo>, StoreError> {
        sqlx::query_as::<_, Curriculo>(
            "SELECT id, nome, email, contato, formacao, experiencia FROM curriculo ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }
}
